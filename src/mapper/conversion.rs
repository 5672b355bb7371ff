use tracing::trace;

use crate::{
    mapper::MapError,
    reflect::{Kind, Reflect, Shape},
    value::SqlValue,
};

/// Intermediate type a column is scanned into before conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvType {
    Bytes,
    Int,
    Uint,
    Float,
    Text,
}

/// A per-column temporary. `None` holds a scanned NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum Temp {
    Bytes(Option<Vec<u8>>),
    Int(Option<i64>),
    Uint(Option<u64>),
    Float(Option<f64>),
    Text(Option<String>),
}

impl Temp {
    pub fn new(conv: ConvType) -> Self {
        match conv {
            ConvType::Bytes => Temp::Bytes(None),
            ConvType::Int => Temp::Int(None),
            ConvType::Uint => Temp::Uint(None),
            ConvType::Float => Temp::Float(None),
            ConvType::Text => Temp::Text(None),
        }
    }

    /// Stores a raw driver value, widened to the temporary's family.
    pub fn fill(&mut self, value: SqlValue) -> Result<(), MapError> {
        match self {
            Temp::Bytes(slot) => *slot = value.to_bytes(),
            Temp::Int(slot) => *slot = value.to_i64()?,
            Temp::Uint(slot) => *slot = value.to_u64()?,
            Temp::Float(slot) => *slot = value.to_f64()?,
            Temp::Text(slot) => *slot = value.to_text(),
        }
        Ok(())
    }

    pub fn is_null(&self) -> bool {
        match self {
            Temp::Bytes(v) => v.is_none(),
            Temp::Int(v) => v.is_none(),
            Temp::Uint(v) => v.is_none(),
            Temp::Float(v) => v.is_none(),
            Temp::Text(v) => v.is_none(),
        }
    }
}

/// Writes a filled temporary into its destination, narrowing as needed.
pub type ConvertFn = fn(&mut dyn Reflect, Temp) -> Result<(), MapError>;

#[derive(Debug, Clone, Copy)]
pub struct Conversion {
    pub temp: ConvType,
    /// Pointer layers between the field and the converted base value.
    pub layers: usize,
    pub convert: ConvertFn,
}

impl Conversion {
    /// Converts `temp` into `dest`. NULL behind a pointer leaves the pointer
    /// empty; otherwise every pointer layer is allocated on the way down.
    pub fn apply(&self, dest: &mut dyn Reflect, temp: Temp) -> Result<(), MapError> {
        if temp.is_null() && self.layers > 0 {
            return Ok(());
        }

        let mut target = dest;
        for layer in 0..self.layers {
            target = target
                .pointee_mut()
                .ok_or_else(|| MapError::conversion(format!("pointer layer {layer} of {} is missing", self.layers)))?;
        }
        (self.convert)(target, temp)
    }
}

/// How a column reaches its destination.
#[derive(Debug, Clone, Copy)]
pub enum Strategy {
    /// The destination's own scan primitive takes the raw value.
    Direct,
    Indirect(Conversion),
}

/// Chooses how to populate a destination of the given shape.
///
/// Types that decode themselves are always scanned directly. Otherwise
/// numeric and text bases go through a widened temporary, so that narrow
/// and derived destinations are written by explicit conversion.
pub fn pick(shape: &Shape) -> Strategy {
    if shape.decode {
        return Strategy::Direct;
    }
    let (base, layers) = shape.peel();
    if base.decode {
        return Strategy::Direct;
    }

    let (temp, convert): (ConvType, ConvertFn) = match base.kind {
        Kind::Text if !base.named => (ConvType::Bytes, text_from_bytes),
        Kind::Text => (ConvType::Text, text_from_text),
        Kind::Int(_) => (ConvType::Int, from_int),
        Kind::Uint(_) => (ConvType::Uint, from_uint),
        Kind::Float(_) => (ConvType::Float, from_float),
        _ => {
            if !base.is_directly_scannable() {
                trace!(type_name = base.name, "no conversion for destination, scanning directly");
            }
            return Strategy::Direct;
        }
    };

    Strategy::Indirect(Conversion { temp, layers, convert })
}

fn text_from_bytes(dest: &mut dyn Reflect, temp: Temp) -> Result<(), MapError> {
    match temp {
        Temp::Bytes(Some(bytes)) => dest.set_bytes(bytes),
        Temp::Bytes(None) => dest.set_text(String::new()),
        other => Err(wrong_temp(dest, &other)),
    }
}

fn text_from_text(dest: &mut dyn Reflect, temp: Temp) -> Result<(), MapError> {
    match temp {
        Temp::Text(text) => dest.set_text(text.unwrap_or_default()),
        other => Err(wrong_temp(dest, &other)),
    }
}

fn from_int(dest: &mut dyn Reflect, temp: Temp) -> Result<(), MapError> {
    match temp {
        Temp::Int(Some(v)) => dest.set_int(v),
        Temp::Int(None) => Err(MapError::null_into(dest.shape().name)),
        other => Err(wrong_temp(dest, &other)),
    }
}

fn from_uint(dest: &mut dyn Reflect, temp: Temp) -> Result<(), MapError> {
    match temp {
        Temp::Uint(Some(v)) => dest.set_uint(v),
        Temp::Uint(None) => Err(MapError::null_into(dest.shape().name)),
        other => Err(wrong_temp(dest, &other)),
    }
}

fn from_float(dest: &mut dyn Reflect, temp: Temp) -> Result<(), MapError> {
    match temp {
        Temp::Float(Some(v)) => dest.set_float(v),
        Temp::Float(None) => Err(MapError::null_into(dest.shape().name)),
        other => Err(wrong_temp(dest, &other)),
    }
}

fn wrong_temp(dest: &dyn Reflect, temp: &Temp) -> MapError {
    MapError::conversion(format!("temporary {temp:?} does not convert into {}", dest.shape().name))
}
