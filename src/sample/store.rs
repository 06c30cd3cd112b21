//! In-memory, grade-scoped sample store.
//!
//! Samples are kept per grade in ascending timestamp order; samples with
//! equal timestamps keep their insertion order. The store holds no derived
//! state. [`SampleStore::compute`] recomputes from the current samples on
//! every call.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::info;

use super::{Sample, SampleId};
use crate::engine::{self, CalculationResult};
use crate::error::{Error, Result};
use crate::grade::Grade;
use crate::regression;

/// Sample store keyed by grade.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use u_gradefit::grade::Grade;
/// use u_gradefit::sample::SampleStore;
///
/// let mut store = SampleStore::new();
/// let t0 = Utc::now();
/// store.record(Grade::N660, 90.2, 5.0, 10.0, t0).unwrap();
/// store.record(Grade::N660, 89.8, 5.2, 10.5, t0 + Duration::minutes(1)).unwrap();
/// let id = store.record(Grade::N660, 90.5, 4.8, 9.8, t0 + Duration::minutes(2)).unwrap();
///
/// // the third sample was predicted by the model fitted on the first two
/// assert!(store.get(id).unwrap().predicted_output().is_some());
/// assert_eq!(store.compute(Grade::N660).n, 3);
/// assert_eq!(store.compute(Grade::N550).n, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SampleStore {
    by_grade: BTreeMap<Grade, Vec<Sample>>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of samples across grades.
    pub fn len(&self) -> usize {
        self.by_grade.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples of `grade`, time-ascending.
    pub fn list_samples(&self, grade: Grade) -> &[Sample] {
        self.by_grade.get(&grade).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Latest sample of `grade`.
    pub fn latest(&self, grade: Grade) -> Option<&Sample> {
        self.list_samples(grade).last()
    }

    pub fn get(&self, id: SampleId) -> Option<&Sample> {
        self.by_grade.values().flatten().find(|s| s.id() == id)
    }

    /// Grades with at least one sample.
    pub fn grades(&self) -> impl Iterator<Item = Grade> + '_ {
        self.by_grade
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(g, _)| *g)
    }

    /// All samples, grouped by grade and time-ascending within a grade.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.by_grade.values().flatten()
    }

    /// Creates a sample from operator input and inserts it.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSample`] if the values violate sample preconditions.
    pub fn record(
        &mut self,
        grade: Grade,
        measured_output: f64,
        input_a: f64,
        input_b: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<SampleId> {
        let sample = Sample::new(grade, measured_output, input_a, input_b, timestamp)?;
        Ok(self.insert(sample))
    }

    /// Inserts a sample, recording the prediction of the model currently in
    /// force for its grade, evaluated at the sample's own inputs.
    ///
    /// The prediction is `None` while the grade has fewer than two samples.
    /// Any prediction already on `sample` is replaced.
    pub fn insert(&mut self, sample: Sample) -> SampleId {
        let model = regression::fit(self.list_samples(sample.grade())).model;
        let predicted = model.and_then(|m| m.predict(&sample));
        let sample = sample.with_predicted_output(predicted);
        info!(
            grade = %sample.grade(),
            id = %sample.id(),
            predicted = ?predicted,
            "inserted sample"
        );
        self.place(sample)
    }

    /// Inserts samples as-is, keeping their recorded predictions.
    ///
    /// Returns the number of samples imported.
    pub fn import<I>(&mut self, samples: I) -> usize
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut count = 0;
        for sample in samples {
            self.place(sample);
            count += 1;
        }
        info!(count, "imported samples");
        count
    }

    /// Removes a sample by identity.
    ///
    /// # Errors
    ///
    /// [`Error::SampleNotFound`] if no sample has this identity.
    pub fn delete(&mut self, id: SampleId) -> Result<Sample> {
        for (grade, samples) in self.by_grade.iter_mut() {
            if let Some(pos) = samples.iter().position(|s| s.id() == id) {
                let removed = samples.remove(pos);
                info!(grade = %grade, id = %id, remaining = samples.len(), "deleted sample");
                return Ok(removed);
            }
        }
        Err(Error::SampleNotFound(id))
    }

    /// Full calculation result for `grade`.
    pub fn compute(&self, grade: Grade) -> CalculationResult {
        engine::compute(self.list_samples(grade))
    }

    fn place(&mut self, sample: Sample) -> SampleId {
        let id = sample.id();
        let samples = self.by_grade.entry(sample.grade()).or_default();
        let pos = samples.partition_point(|s| s.timestamp() <= sample.timestamp());
        samples.insert(pos, sample);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FitStatus;
    use chrono::Duration;

    fn t(i: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::minutes(i)
    }

    fn seeded() -> (SampleStore, Vec<SampleId>) {
        let mut store = SampleStore::new();
        let ids = vec![
            store.record(Grade::N660, 90.2, 5.0, 10.0, t(0)).unwrap(),
            store.record(Grade::N660, 89.8, 5.2, 10.5, t(1)).unwrap(),
            store.record(Grade::N660, 90.5, 4.8, 9.8, t(2)).unwrap(),
        ];
        (store, ids)
    }

    #[test]
    fn empty_store() {
        let store = SampleStore::new();
        assert!(store.is_empty());
        assert!(store.list_samples(Grade::N660).is_empty());
        assert!(store.latest(Grade::N660).is_none());
        assert_eq!(store.compute(Grade::N660).status(), FitStatus::NoData);
    }

    #[test]
    fn first_two_samples_have_no_prediction() {
        let (store, ids) = seeded();
        assert_eq!(store.get(ids[0]).unwrap().predicted_output(), None);
        assert_eq!(store.get(ids[1]).unwrap().predicted_output(), None);
        assert!(store.get(ids[2]).unwrap().predicted_output().is_some());
    }

    #[test]
    fn prediction_uses_model_before_insertion() {
        let mut store = SampleStore::new();
        store.record(Grade::N660, 90.2, 5.0, 10.0, t(0)).unwrap();
        store.record(Grade::N660, 89.8, 5.2, 10.5, t(1)).unwrap();
        let prior = store.compute(Grade::N660).model().unwrap();
        let id = store.record(Grade::N660, 90.5, 4.8, 9.8, t(2)).unwrap();
        assert_eq!(
            store.get(id).unwrap().predicted_output(),
            prior.evaluate(4.8, 9.8)
        );
    }

    #[test]
    fn grades_are_isolated() {
        let (mut store, _) = seeded();
        store.record(Grade::N550, 121.0, 3.0, 8.0, t(3)).unwrap();
        assert_eq!(store.list_samples(Grade::N660).len(), 3);
        assert_eq!(store.list_samples(Grade::N550).len(), 1);
        assert_eq!(store.compute(Grade::N550).status(), FitStatus::InsufficientForRegression);
        // an N550 sample never gets a prediction from the N660 model
        assert!(store.latest(Grade::N550).unwrap().predicted_output().is_none());
        assert_eq!(store.grades().collect::<Vec<_>>(), vec![Grade::N660, Grade::N550]);
    }

    #[test]
    fn list_is_time_ascending_even_when_backdated() {
        let (mut store, _) = seeded();
        let late = store.record(Grade::N660, 90.0, 5.1, 10.1, t(-5)).unwrap();
        let list = store.list_samples(Grade::N660);
        assert_eq!(list[0].id(), late);
        assert!(list.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
    }

    #[test]
    fn equal_timestamps_keep_insertion_order() {
        let mut store = SampleStore::new();
        let a = store.record(Grade::N772, 65.0, 5.0, 10.0, t(0)).unwrap();
        let b = store.record(Grade::N772, 65.5, 5.0, 10.0, t(0)).unwrap();
        assert_eq!(store.latest(Grade::N772).unwrap().id(), b);
        assert_eq!(store.list_samples(Grade::N772)[0].id(), a);
    }

    #[test]
    fn deleting_latest_reanchors() {
        let (mut store, ids) = seeded();
        let before = store.compute(Grade::N660);
        let removed = store.delete(ids[2]).unwrap();
        assert_eq!(removed.id(), ids[2]);
        let after = store.compute(Grade::N660);
        assert_eq!(after.n, 2);
        assert_ne!(before.intercept, after.intercept);
        assert_ne!(before.predicted_output, after.predicted_output);
        assert_eq!(store.latest(Grade::N660).unwrap().id(), ids[1]);
    }

    #[test]
    fn deleting_below_two_never_fails() {
        let (mut store, ids) = seeded();
        store.delete(ids[2]).unwrap();
        store.delete(ids[0]).unwrap();
        let one = store.compute(Grade::N660);
        assert_eq!(one.status(), FitStatus::InsufficientForRegression);
        assert!(one.predicted_output.is_none());
        store.delete(ids[1]).unwrap();
        assert_eq!(store.compute(Grade::N660), CalculationResult::empty());
    }

    #[test]
    fn delete_unknown_is_error() {
        let (mut store, _) = seeded();
        let err = store.delete(SampleId::new()).unwrap_err();
        assert!(matches!(err, Error::SampleNotFound(_)));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn import_keeps_recorded_predictions() {
        let mut store = SampleStore::new();
        let s = Sample::new(Grade::N774, 72.1, 5.0, 10.0, t(0))
            .unwrap()
            .with_predicted_output(Some(71.8));
        assert_eq!(store.import(vec![s]), 1);
        assert_eq!(store.latest(Grade::N774).unwrap().predicted_output(), Some(71.8));
    }

    #[test]
    fn record_rejects_invalid_flow() {
        let mut store = SampleStore::new();
        assert!(store.record(Grade::N660, 90.0, 0.0, 10.0, t(0)).is_err());
        assert!(store.is_empty());
    }
}
