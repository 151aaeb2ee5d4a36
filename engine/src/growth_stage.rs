//! Growth stage resolution
//!
//! Maps (crop, days after sowing) to the crop's physiological stage using
//! the crop's stage table.

use chrono::NaiveDate;
use shared::{validate_sowing_date, GrowthStage, StageBoundary};

use crate::error::{EngineError, EngineResult};
use crate::knowledge::KnowledgeBase;

/// Days elapsed between sowing and `as_of`
pub fn days_after_sowing(sowing_date: NaiveDate, as_of: NaiveDate) -> EngineResult<u32> {
    validate_sowing_date(sowing_date, as_of)?;
    let days = (as_of - sowing_date).num_days();
    u32::try_from(days).map_err(|_| EngineError::InvalidInput(format!("{} days after sowing is out of range", days)))
}

/// Resolves growth stages against a knowledge base
#[derive(Debug, Clone, Copy)]
pub struct GrowthStageResolver<'a> {
    kb: &'a KnowledgeBase,
}

impl<'a> GrowthStageResolver<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self { kb }
    }

    /// Stage for `das`. Fails when the crop is unknown or already past its
    /// final stage.
    pub fn resolve(&self, crop: &str, das: u32) -> EngineResult<GrowthStage> {
        let knowledge = self.kb.crop(crop)?;
        let boundary = knowledge
            .stages
            .iter()
            .find(|s| s.days.contains(das))
            .ok_or_else(|| EngineError::OutOfRange {
                crop: knowledge.name.clone(),
                das,
                lifecycle_end: knowledge.lifecycle_end(),
            })?;

        tracing::debug!(crop = %knowledge.name, das, stage = %boundary.stage, "Resolved growth stage");

        Ok(GrowthStage {
            crop: knowledge.name.clone(),
            stage: boundary.stage,
            days: boundary.days,
            days_after_sowing: das,
            day_offset: das - boundary.days.start,
        })
    }

    /// Stage on `as_of` for a crop sown on `sowing_date`
    pub fn resolve_on(&self, crop: &str, sowing_date: NaiveDate, as_of: NaiveDate) -> EngineResult<GrowthStage> {
        self.resolve(crop, days_after_sowing(sowing_date, as_of)?)
    }

    /// Last day after sowing covered by the crop's stage table
    pub fn lifecycle_end(&self, crop: &str) -> EngineResult<u32> {
        Ok(self.kb.crop(crop)?.lifecycle_end())
    }

    pub fn stage_table(&self, crop: &str) -> EngineResult<&'a [StageBoundary]> {
        Ok(&self.kb.crop(crop)?.stages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::GrowthStageKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_after_sowing() {
        assert_eq!(days_after_sowing(date(2025, 11, 10), date(2025, 11, 30)), Ok(20));
        assert_eq!(days_after_sowing(date(2025, 11, 10), date(2025, 11, 10)), Ok(0));
        assert!(matches!(
            days_after_sowing(date(2025, 11, 10), date(2025, 11, 9)),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_resolve_on_dates() {
        let kb = KnowledgeBase::builtin();
        let stage = GrowthStageResolver::new(&kb)
            .resolve_on("wheat", date(2025, 11, 10), date(2025, 11, 30))
            .unwrap();
        assert_eq!(stage.stage, GrowthStageKind::Tillering);
        assert_eq!(stage.day_offset, 5);
        assert_eq!(stage.days_remaining(), 15);
    }
}
