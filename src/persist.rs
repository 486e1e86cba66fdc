//! Saving and restoring learned state as JSON
//!
//! Anything that implements [`Serialize`] can be saved: Q tables, priority tables, environment
//! models, tile coders and their configs. The tables and coders check their own consistency
//! while being read back, so a blob whose contents disagree with its declared shape fails to
//! load instead of panicking later.
use std::io::{Read, Write};

use log::warn;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    algo::tabular::QTable,
    error::{Error, Result},
};

/// Write `value` to `writer` as JSON
pub fn save<T: Serialize, W: Write>(value: &T, writer: W) -> Result<()> {
    serde_json::to_writer(writer, value)?;
    Ok(())
}

/// Read a value previously written with [`save`]
pub fn load<T: DeserializeOwned, R: Read>(reader: R) -> Result<T> {
    Ok(serde_json::from_reader(reader)?)
}

/// Read a [`QTable`] and check that it has the expected shape
pub fn load_q_table<R: Read>(reader: R, n_states: usize, n_actions: usize) -> Result<QTable> {
    let table: QTable = load(reader)?;
    if table.shape() != (n_states, n_actions) {
        warn!(
            "stored Q table has shape {:?}, expected ({n_states}, {n_actions})",
            table.shape()
        );
        return Err(Error::ShapeMismatch {
            expected: (n_states, n_actions),
            got: table.shape(),
        });
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algo::planning::EnvironmentModel,
        approx::{TileCodedQ, TileCoder, TileCoderConfig},
        ds::PriorityTable,
    };

    #[test]
    fn q_table_survives_save_and_load() {
        let mut table = QTable::new(3, 2);
        table.update(1, 0, 4.0, 0.5);
        table.update(2, 1, -1.0, 1.0);

        let mut buf = Vec::new();
        save(&table, &mut buf).unwrap();
        let loaded = load_q_table(buf.as_slice(), 3, 2).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.get(1, 0), 2.0);
    }

    #[test]
    fn load_q_table_checks_shape() {
        let mut buf = Vec::new();
        save(&QTable::new(3, 2), &mut buf).unwrap();
        assert!(matches!(
            load_q_table(buf.as_slice(), 4, 2),
            Err(Error::ShapeMismatch {
                expected: (4, 2),
                got: (3, 2)
            })
        ));
    }

    #[test]
    fn load_q_table_rejects_truncated_values() {
        let json = r#"{"n_states":2,"n_actions":2,"values":[0.0,1.0]}"#;
        assert!(matches!(
            load_q_table(json.as_bytes(), 2, 2),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn load_reports_malformed_json() {
        assert!(matches!(
            load::<QTable, _>("{not json".as_bytes()),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn model_and_tiles_survive_save_and_load() {
        let mut model = EnvironmentModel::new(3, 2);
        model.add(0, 1, 0.5, 1);
        model.add(2, 1, 0.5, 1);
        let mut buf = Vec::new();
        save(&model, &mut buf).unwrap();
        let loaded: EnvironmentModel = load(buf.as_slice()).unwrap();
        assert_eq!(loaded.get(0, 1), (Some(1), 0.5));
        assert_eq!(loaded.get_predecessors(1), [(0, 1), (2, 1)]);

        let mut q = TileCodedQ::new(&TileCoderConfig::uniform(vec![0.0], vec![1.0], 4, 2), 2).unwrap();
        q.write(&[0.3], 1, 2.0);
        let mut buf = Vec::new();
        save(&q, &mut buf).unwrap();
        let loaded: TileCodedQ = load(buf.as_slice()).unwrap();
        assert_eq!(loaded, q);
    }

    #[test]
    fn load_rejects_model_with_missing_transitions() {
        let json = r#"{"n_states":3,"n_actions":2,"transitions":[null],
            "rewards":[0,0,0,0,0,0],"predecessors":[[],[],[]]}"#;
        assert!(load::<EnvironmentModel, _>(json.as_bytes()).is_err());

        let json = r#"{"n_states":2,"n_actions":1,"transitions":[null,null],
            "rewards":[0,0],"predecessors":[[],[[0,0]]]}"#;
        assert!(
            load::<EnvironmentModel, _>(json.as_bytes()).is_err(),
            "predecessor that was never observed"
        );
    }

    #[test]
    fn priority_table_recounts_queue_on_load() {
        let json = r#"{"n_states":1,"n_actions":2,"priorities":[0.0,0.5],"queued":0}"#;
        let mut queue: PriorityTable = load(json.as_bytes()).unwrap();
        assert_eq!(queue.len(), 1, "queued pairs rebuilt from the priorities");
        assert_eq!(queue.pop_max(), Some((0, 1, 0.5)));
        assert!(queue.is_empty());

        let mut original = PriorityTable::new(2, 2);
        original.raise(1, 0, 0.25, 0.0);
        let mut buf = Vec::new();
        save(&original, &mut buf).unwrap();
        assert_eq!(load::<PriorityTable, _>(buf.as_slice()).unwrap(), original);

        let bad = r#"{"n_states":1,"n_actions":2,"priorities":[-1.0,0.5]}"#;
        assert!(load::<PriorityTable, _>(bad.as_bytes()).is_err(), "negative priority");
        let short = r#"{"n_states":2,"n_actions":2,"priorities":[0.5]}"#;
        assert!(load::<PriorityTable, _>(short.as_bytes()).is_err(), "too few entries");
    }

    #[test]
    fn load_rejects_tile_weights_of_wrong_length() {
        let config = TileCoderConfig::uniform(vec![0.0], vec![1.0], 4, 2);
        let mut buf = Vec::new();
        save(&TileCoder::new(&config).unwrap(), &mut buf).unwrap();
        let mut json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        json["weights"].as_array_mut().unwrap().pop();
        assert!(load::<TileCoder, _>(json.to_string().as_bytes()).is_err());

        let mut buf = Vec::new();
        save(&TileCodedQ::new(&config, 3).unwrap(), &mut buf).unwrap();
        let mut json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        json["n_actions"] = 4.into();
        assert!(load::<TileCodedQ, _>(json.to_string().as_bytes()).is_err());
    }
}
