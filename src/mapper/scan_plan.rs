use std::any::TypeId;

use crate::{
    mapper::{pick, ColumnSignature, Conversion, FieldIndex, FieldPath, MapError, Strategy},
    reflect::Shape,
};

/// Cache key of a plan. The column count separates signatures whose hashes
/// collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlanKey {
    pub type_id: TypeId,
    pub hash: u64,
    pub columns: usize,
}

impl PlanKey {
    pub fn new(type_id: TypeId, signature: &ColumnSignature) -> Self {
        Self { type_id, hash: signature.hash, columns: signature.len() }
    }
}

/// How one column populates the destination.
#[derive(Debug, Clone)]
pub enum ScanStep {
    /// Column has no destination field; its value is discarded.
    Drop,
    Direct(FieldPath),
    Indirect(FieldPath, Conversion),
    /// The destination decodes the single column itself.
    WholeDecode,
}

/// One step per column, in column order.
#[derive(Debug, Clone)]
pub struct Plan {
    pub type_name: &'static str,
    pub columns: Vec<String>,
    pub steps: Vec<ScanStep>,
    pub composite: bool,
    pub whole_decode: bool,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn column_name(&self, column: usize) -> &str {
        self.columns.get(column).map(String::as_str).unwrap_or("?")
    }
}

pub struct PlanBuilder;

impl PlanBuilder {
    pub fn build(shape: &Shape, signature: &ColumnSignature, index: Option<&FieldIndex>) -> Result<Plan, MapError> {
        if signature.is_empty() {
            return Err(MapError::ZeroColumns);
        }
        match index {
            Some(index) if shape.is_record() => Ok(Self::for_record(shape, signature, index)),
            _ => Self::for_scalar(shape, signature),
        }
    }

    /// Matches every column against the record's field index; unmatched
    /// columns are dropped.
    pub fn for_record(shape: &Shape, signature: &ColumnSignature, index: &FieldIndex) -> Plan {
        let steps = signature
            .names
            .iter()
            .map(|name| match index.get(name) {
                Some(path) => Self::step_for(shape, path),
                None => ScanStep::Drop,
            })
            .collect();

        Plan {
            type_name: shape.name,
            columns: signature.names.clone(),
            steps,
            composite: true,
            whole_decode: false,
        }
    }

    pub fn for_scalar(shape: &Shape, signature: &ColumnSignature) -> Result<Plan, MapError> {
        if signature.len() != 1 {
            return Err(MapError::ColumnCountMismatch { type_name: shape.name, got: signature.len() });
        }

        let whole_decode = shape.deref().decode;
        let step = if whole_decode { ScanStep::WholeDecode } else { Self::step_for(shape, &FieldPath::root()) };

        Ok(Plan {
            type_name: shape.name,
            columns: signature.names.clone(),
            steps: vec![step],
            composite: false,
            whole_decode,
        })
    }

    fn step_for(shape: &Shape, path: &FieldPath) -> ScanStep {
        let field = match shape.field_shape(path) {
            Some(field) => field,
            None => return ScanStep::Drop,
        };
        match pick(&field) {
            Strategy::Direct => ScanStep::Direct(path.clone()),
            Strategy::Indirect(conversion) => ScanStep::Indirect(path.clone(), conversion),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{impl_decode, impl_record, ConvType, Decode, Mappable, SqlValue};

    #[derive(Debug, Default)]
    struct Row {
        id: i32,
        name: String,
        active: bool,
    }
    impl_record!(Row { id: i32, name: String, active: bool });

    #[derive(Debug, Default)]
    struct Point(i64, i64);

    impl Decode for Point {
        fn decode(&mut self, value: SqlValue) -> Result<(), MapError> {
            let text = value.to_text().unwrap_or_default();
            let (x, y) = text.split_once(',').ok_or_else(|| MapError::conversion("not a point"))?;
            self.0 = x.trim().parse().map_err(|_| MapError::conversion("bad x"))?;
            self.1 = y.trim().parse().map_err(|_| MapError::conversion("bad y"))?;
            Ok(())
        }
    }
    impl_decode!(Point);

    #[test]
    fn test_record_plan_matches_columns() {
        let shape = Row::type_shape();
        let index = FieldIndex::build(&shape, 32).unwrap();
        let signature = ColumnSignature::new(&["ACTIVE", "extra", "\"id\""]);
        let plan = PlanBuilder::build(&shape, &signature, Some(&index)).unwrap();

        assert!(plan.composite);
        assert_eq!(plan.len(), 3);
        assert!(matches!(plan.steps[0], ScanStep::Direct(ref p) if p.indices() == [2]));
        assert!(matches!(plan.steps[1], ScanStep::Drop));
        match &plan.steps[2] {
            ScanStep::Indirect(path, conversion) => {
                assert_eq!(path.indices(), [0]);
                assert_eq!(conversion.temp, ConvType::Int);
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn test_scalar_plan_requires_one_column() {
        let err = PlanBuilder::for_scalar(&i64::type_shape(), &ColumnSignature::new(&["a", "b"])).unwrap_err();
        assert!(matches!(err, MapError::ColumnCountMismatch { got: 2, .. }));

        let err = PlanBuilder::build(&Row::type_shape(), &ColumnSignature::new::<&str>(&[]), None).unwrap_err();
        assert_eq!(err, MapError::ZeroColumns);
    }

    #[test]
    fn test_decode_scalar_is_whole_decode() {
        let plan = PlanBuilder::for_scalar(&Point::type_shape(), &ColumnSignature::new(&["p"])).unwrap();
        assert!(plan.whole_decode);
        assert!(matches!(plan.steps[0], ScanStep::WholeDecode));

        let err = PlanBuilder::for_scalar(&Point::type_shape(), &ColumnSignature::new(&["x", "y"])).unwrap_err();
        assert!(matches!(err, MapError::ColumnCountMismatch { .. }));
    }
}
