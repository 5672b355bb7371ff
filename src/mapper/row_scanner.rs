use crate::{
    mapper::{FieldPath, MapError, Plan, ScanDest, ScanStep, Temp},
    reflect::{Mappable, Reflect},
    value::{RawBytes, SqlValue},
};

/// Scan destinations for one row of `T`, laid out by a plan.
///
/// Direct and whole-decode columns are written straight into the value;
/// indirect columns land in temporaries that `finalize` converts once the
/// whole row has been scanned. Dropped columns share one sink.
pub struct Destinations<'a, T: Mappable> {
    plan: &'a Plan,
    root: &'a mut T,
    temps: Vec<Option<Temp>>,
    sink: RawBytes,
}

impl<'a, T: Mappable> Destinations<'a, T> {
    pub fn new(plan: &'a Plan, root: &'a mut T) -> Self {
        let temps = plan
            .steps
            .iter()
            .map(|step| match step {
                ScanStep::Indirect(_, conversion) => Some(Temp::new(conversion.temp)),
                _ => None,
            })
            .collect();

        Self { plan, root, temps, sink: RawBytes::default() }
    }

    /// Converts every temporary into its field, in column order. Stops at
    /// the first failure; fields converted before it keep their values.
    pub fn finalize(self) -> Result<(), MapError> {
        let Self { plan, root, temps, .. } = self;

        for (column, (step, temp)) in plan.steps.iter().zip(temps).enumerate() {
            let (ScanStep::Indirect(path, conversion), Some(temp)) = (step, temp) else {
                continue;
            };
            // NULL behind a pointer must not allocate anything along the path
            if temp.is_null() && conversion.layers > 0 {
                continue;
            }
            let target = resolve_mut(&mut *root, path)?;
            conversion
                .apply(target, temp)
                .map_err(|e| e.at_column(column, plan.column_name(column)))?;
        }
        Ok(())
    }
}

impl<T: Mappable> ScanDest for Destinations<'_, T> {
    fn width(&self) -> usize {
        self.plan.len()
    }

    fn put(&mut self, column: usize, value: SqlValue) -> Result<(), MapError> {
        let plan = self.plan;
        let step = plan
            .steps
            .get(column)
            .ok_or_else(|| MapError::Cursor(format!("column {column} is out of range for {}", plan.type_name)))?;

        let result = match step {
            ScanStep::Drop => {
                self.sink.absorb(&value);
                Ok(())
            }
            ScanStep::Direct(path) => resolve_mut(&mut *self.root, path).and_then(|target| target.scan(value)),
            ScanStep::WholeDecode => self.root.scan(value),
            ScanStep::Indirect(..) => match self.temps.get_mut(column) {
                Some(Some(temp)) => temp.fill(value),
                _ => Err(MapError::conversion("missing temporary")),
            },
        };
        result.map_err(|e| e.at_column(column, plan.column_name(column)))
    }
}

/// Walks `path` from `root`, allocating pointer layers on the way.
pub fn resolve_mut<'r>(root: &'r mut dyn Reflect, path: &FieldPath) -> Result<&'r mut dyn Reflect, MapError> {
    let mut target = root;
    for (hop, &index) in path.indices().iter().enumerate() {
        target = target
            .field_mut(index)
            .ok_or_else(|| MapError::conversion(format!("field path {:?} breaks at hop {hop}", path.indices())))?;
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{impl_record, ColumnSignature, FieldIndex, PlanBuilder};

    #[derive(Debug, Default)]
    struct Inner {
        score: Option<i16>,
    }
    impl_record!(Inner { score: Option<i16> });

    #[derive(Debug, Default)]
    struct Row {
        id: i32,
        label: String,
        inner: Option<Inner>,
    }
    impl_record!(Row { id: i32, label: String, inner: Option<Inner> [embedded] });

    fn plan_for(columns: &[&str]) -> Plan {
        let shape = Row::type_shape();
        let index = FieldIndex::build(&shape, 32).unwrap();
        PlanBuilder::for_record(&shape, &ColumnSignature::new(columns), &index)
    }

    #[test]
    fn test_values_land_after_finalize() {
        let plan = plan_for(&["id", "label", "score", "ignored"]);
        let mut row = Row::default();
        let mut dest = Destinations::new(&plan, &mut row);
        dest.put(0, SqlValue::Int(7)).unwrap();
        dest.put(1, SqlValue::Bytes(b"x".to_vec())).unwrap();
        dest.put(2, SqlValue::Int(3)).unwrap();
        dest.put(3, SqlValue::Text("dropped".into())).unwrap();
        dest.finalize().unwrap();

        assert_eq!(row.id, 7);
        assert_eq!(row.label, "x");
        assert_eq!(row.inner.and_then(|i| i.score), Some(3));
    }

    #[test]
    fn test_null_leaves_pointer_chain_empty() {
        let plan = plan_for(&["score"]);
        let mut row = Row::default();
        let mut dest = Destinations::new(&plan, &mut row);
        dest.put(0, SqlValue::Null).unwrap();
        dest.finalize().unwrap();
        assert!(row.inner.is_none());
    }

    #[test]
    fn test_finalize_stops_at_first_failure() {
        let plan = plan_for(&["label", "id", "score"]);
        let mut row = Row::default();
        let mut dest = Destinations::new(&plan, &mut row);
        dest.put(0, SqlValue::Text("kept".into())).unwrap();
        dest.put(1, SqlValue::Int(i64::MAX)).unwrap();
        dest.put(2, SqlValue::Int(1)).unwrap();

        let err = dest.finalize().unwrap_err();
        match err {
            MapError::ConversionFailure(message) => assert!(message.contains("column 1 (id)")),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(row.label, "kept");
        assert!(row.inner.is_none());
    }

    #[test]
    fn test_put_out_of_range() {
        let plan = plan_for(&["id"]);
        let mut row = Row::default();
        let mut dest = Destinations::new(&plan, &mut row);
        assert_eq!(dest.width(), 1);
        assert!(matches!(dest.put(1, SqlValue::Int(1)), Err(MapError::Cursor(_))));
    }
}
