use std::{any::TypeId, sync::Arc};

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::{debug, trace};

use crate::{
    config::Config,
    mapper::{ColumnSignature, Destinations, FieldIndex, MapError, Plan, PlanBuilder, PlanKey, Rows},
    reflect::{Mappable, Shape},
};

static MAPPER: Lazy<Mapper> = Lazy::new(Mapper::new);

/// The process-wide mapper with default configuration.
pub fn mapper() -> &'static Mapper {
    &MAPPER
}

/// Maps cursor rows into typed values, caching field indexes per type and
/// scan plans per type and column signature.
///
/// Both caches only grow. Builds run without a lock, so two threads may
/// build the same plan; the results are identical and the last insert wins.
pub struct Mapper {
    plans: DashMap<PlanKey, Arc<Plan>>,
    indexes: DashMap<TypeId, Arc<FieldIndex>>,
    config: Config,
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapper {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            plans: DashMap::new(),
            indexes: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The scan plan of `T` for the given column labels.
    pub fn plan<T: Mappable, S: AsRef<str>>(&self, columns: &[S]) -> Result<Arc<Plan>, MapError> {
        self.plan_for::<T>(&ColumnSignature::new(columns))
    }

    fn plan_for<T: Mappable>(&self, signature: &ColumnSignature) -> Result<Arc<Plan>, MapError> {
        if signature.is_empty() {
            return Err(MapError::ZeroColumns);
        }

        let key = PlanKey::new(TypeId::of::<T>(), signature);
        if let Some(plan) = self.plans.get(&key) {
            if plan.columns == signature.names {
                return Ok(Arc::clone(plan.value()));
            }
            trace!(type_name = plan.type_name, "column signature hash collision, planning uncached");
            drop(plan);
            return self.build_plan(&T::type_shape(), signature).map(Arc::new);
        }

        let plan = Arc::new(self.build_plan(&T::type_shape(), signature)?);
        debug!(
            type_name = plan.type_name,
            columns = signature.len(),
            composite = plan.composite,
            "built scan plan"
        );
        self.plans.insert(key, Arc::clone(&plan));
        Ok(plan)
    }

    fn build_plan(&self, shape: &Shape, signature: &ColumnSignature) -> Result<Plan, MapError> {
        if shape.is_record() {
            let index = self.field_index(shape)?;
            PlanBuilder::build(shape, signature, Some(&index))
        } else {
            PlanBuilder::build(shape, signature, None)
        }
    }

    /// The field index of the record behind `shape`.
    pub fn field_index(&self, shape: &Shape) -> Result<Arc<FieldIndex>, MapError> {
        let base = shape.deref();
        if let Some(index) = self.indexes.get(&base.id) {
            return Ok(Arc::clone(index.value()));
        }

        let index = Arc::new(FieldIndex::build(&base, self.config.max_depth)?);
        debug!(type_name = base.name, fields = index.len(), "built field index");
        self.indexes.insert(base.id, Arc::clone(&index));
        Ok(index)
    }

    /// Scans the cursor's current row into a fresh `T`.
    ///
    /// On a conversion failure the partially filled value is discarded.
    pub fn scan_row<T: Mappable>(&self, rows: &mut dyn Rows) -> Result<T, MapError> {
        let columns = rows.columns()?;
        let plan = self.plan::<T, String>(&columns)?;
        Self::scan_with(&plan, rows)
    }

    /// Drains the cursor into a vector, closing it afterwards. An empty
    /// result is an empty vector whatever its columns.
    pub fn collect<T: Mappable>(&self, rows: &mut dyn Rows) -> Result<Vec<T>, MapError> {
        let result = self.collect_open::<T>(rows);
        let closed = rows.close();
        let values = result?;
        closed?;
        Ok(values)
    }

    /// Scans the first row and closes the cursor. An empty result is
    /// `MapError::NoRows`.
    pub fn first<T: Mappable>(&self, rows: &mut dyn Rows) -> Result<T, MapError> {
        let result = if rows.next() {
            self.scan_row::<T>(rows)
        } else {
            Err(rows.err().unwrap_or(MapError::NoRows))
        };
        let closed = rows.close();
        let value = result?;
        closed?;
        Ok(value)
    }

    // The plan waits for the first row, so an empty result is never
    // rejected over its column shape.
    fn collect_open<T: Mappable>(&self, rows: &mut dyn Rows) -> Result<Vec<T>, MapError> {
        let mut plan: Option<Arc<Plan>> = None;
        let mut values = Vec::new();
        while rows.next() {
            if plan.is_none() {
                let columns = rows.columns()?;
                plan = Some(self.plan::<T, String>(&columns)?);
            }
            if let Some(plan) = &plan {
                values.push(Self::scan_with(plan, rows)?);
            }
        }
        match rows.err() {
            Some(err) => Err(err),
            None => Ok(values),
        }
    }

    fn scan_with<T: Mappable>(plan: &Plan, rows: &mut dyn Rows) -> Result<T, MapError> {
        let mut value = T::default();
        let mut dest = Destinations::new(plan, &mut value);
        rows.scan(&mut dest)?;
        dest.finalize()?;
        Ok(value)
    }

    pub fn cached_plans(&self) -> usize {
        self.plans.len()
    }

    pub fn cached_indexes(&self) -> usize {
        self.indexes.len()
    }
}
