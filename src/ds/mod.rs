mod priority_table;

pub use priority_table::PriorityTable;
