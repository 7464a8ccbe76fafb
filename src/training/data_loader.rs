//! Training data loading and templating for adapter fine-tuning

use crate::error::{Error, Result};
use crate::runtime::backend::TrainingRow;
use crate::runtime::template_engine::{TemplateEngine, INPUT_FIELD};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// One data record: field name to text.
pub type Record = BTreeMap<String, String>;

/// Record ordering applied after loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shuffle {
    /// Keep file order
    None,
    /// Reproducible shuffle
    Seeded(u64),
    #[default]
    Random,
}

/// Ordered collection of raw records
#[derive(Debug, Clone, Default)]
pub struct TrainingDataset {
    pub records: Vec<Record>,
}

impl TrainingDataset {
    /// Load a JSON array of records, or JSON Lines when the file ends in `.jsonl`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let dataset = match path.extension().and_then(|ext| ext.to_str()) {
            Some("jsonl") => Self::from_jsonl(&content)?,
            _ => Self::from_json(&content)?,
        };
        info!("Loaded {} records from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let values: Vec<Value> = serde_json::from_str(content)?;
        let records = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| to_record(index, value))
            .collect::<Result<_>>()?;
        Ok(Self { records })
    }

    pub fn from_jsonl(content: &str) -> Result<Self> {
        let mut records = Vec::new();
        for (line_num, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line)?;
            records.push(to_record(line_num, value)?);
        }
        Ok(Self { records })
    }

    pub fn shuffle(&mut self, shuffle: Shuffle) {
        match shuffle {
            Shuffle::None => {}
            Shuffle::Seeded(seed) => self.records.shuffle(&mut StdRng::seed_from_u64(seed)),
            Shuffle::Random => self.records.shuffle(&mut rand::thread_rng()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }
}

fn to_record(index: usize, value: Value) -> Result<Record> {
    let Value::Object(map) = value else {
        return Err(Error::data(format!("record {} is not an object", index)));
    };
    Ok(fields(map))
}

fn fields(map: Map<String, Value>) -> Record {
    map.into_iter()
        .map(|(name, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (name, text)
        })
        .collect()
}

/// Turns raw records into training rows.
///
/// With templates every record is rendered; without them the record's
/// `input` field is used as is.
pub struct DataProcessor {
    template: TemplateEngine,
}

impl DataProcessor {
    pub fn new(template: TemplateEngine) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &TemplateEngine {
        &self.template
    }

    /// Load, order and template the dataset at `path`.
    pub fn load_data(&self, path: &Path, shuffle: Shuffle) -> Result<Vec<TrainingRow>> {
        let mut dataset = TrainingDataset::from_path(path)?;
        dataset.shuffle(shuffle);
        self.prepare(&dataset)
    }

    pub fn prepare(&self, dataset: &TrainingDataset) -> Result<Vec<TrainingRow>> {
        let templated = self.template.has_templates();
        debug!(records = dataset.len(), templated, "Preparing training rows");

        dataset
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let input = if templated {
                    self.template
                        .render(record)
                        .map_err(|source| Error::Record { index, source })?
                } else {
                    record.get(INPUT_FIELD).cloned().ok_or_else(|| {
                        Error::data(format!("record {} has no '{}' field", index, INPUT_FIELD))
                    })?
                };
                Ok(TrainingRow { input })
            })
            .collect()
    }
}
