pub mod map_error;
pub use map_error::*;

pub mod column;
pub use column::*;

pub mod field_index;
pub use field_index::*;

pub mod conversion;
pub use conversion::*;

pub mod scan_plan;
pub use scan_plan::*;

pub mod rows;
pub use rows::*;

pub mod row_scanner;
pub use row_scanner::*;

pub mod row_mapper;
pub use row_mapper::*;
