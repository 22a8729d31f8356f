use crate::types::EducationRecord;
use std::collections::HashMap;
use tracing::debug;

/// Lookup from FIPS code to the county's education record.
#[derive(Debug, Clone, Default)]
pub struct EducationIndex {
    records: HashMap<u32, EducationRecord>,
}

impl EducationIndex {
    /// Single pass over `records`; on a repeated FIPS the later record wins.
    pub fn from_records(records: Vec<EducationRecord>) -> Self {
        let mut map = HashMap::with_capacity(records.len());
        for record in records {
            let fips = record.fips;
            if map.insert(fips, record).is_some() {
                debug!(fips, "duplicate education record replaced");
            }
        }
        Self { records: map }
    }

    pub fn get(&self, fips: u32) -> Option<&EducationRecord> {
        self.records.get(&fips)
    }

    pub fn attainment(&self, fips: u32) -> Option<f64> {
        self.get(fips).map(|r| r.bachelors_or_higher)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
