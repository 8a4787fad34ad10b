use std::cmp::Ordering;

use crate::pickling::SerializationError;
use crate::types::value::Value;

/// Total order used to canonicalize set elements.
///
/// Numbers compare numerically across bool/int/float; strings, bytes, lists
/// and tuples compare with their own kind. Any other pairing has no order and
/// is reported as `Unorderable` instead of being guessed.
pub fn canonical_cmp(a: &Value, b: &Value) -> Result<Ordering, SerializationError> {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
        (Value::Bytes(x), Value::Bytes(y)) => Ok(x.cmp(y)),
        (Value::List(x), Value::List(y)) | (Value::Tuple(x), Value::Tuple(y)) => {
            cmp_sequences(x, y)
        }
        _ => match (numeric(a), numeric(b)) {
            (Some(x), Some(y)) => cmp_numbers(x, y, a, b),
            _ => Err(unorderable(a, b)),
        },
    }
}

/// Sorts `items` in canonical order, failing on the first incomparable pair.
///
/// Merge sort: every pair that ends up adjacent in the output has been
/// compared, so a set mixing incomparable kinds always fails, whatever order
/// its elements arrive in.
pub fn sort_canonical<'a>(items: Vec<&'a Value>) -> Result<Vec<&'a Value>, SerializationError> {
    if items.len() <= 1 {
        return Ok(items);
    }

    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = sort_canonical(left)?;
    let right = sort_canonical(right)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if canonical_cmp(right[j], left[i])? == Ordering::Less {
            merged.push(right[j]);
            j += 1;
        } else {
            merged.push(left[i]);
            i += 1;
        }
    }
    merged.extend_from_slice(&left[i..]);
    merged.extend_from_slice(&right[j..]);
    Ok(merged)
}

fn cmp_sequences(x: &[Value], y: &[Value]) -> Result<Ordering, SerializationError> {
    for (a, b) in x.iter().zip(y) {
        let ord = canonical_cmp(a, b)?;
        if ord != Ordering::Equal {
            return Ok(ord);
        }
    }
    Ok(x.len().cmp(&y.len()))
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

fn numeric(v: &Value) -> Option<Number> {
    match v {
        Value::Bool(b) => Some(Number::Int(i64::from(*b))),
        Value::Int(i) => Some(Number::Int(*i)),
        Value::Float(f) => Some(Number::Float(*f)),
        _ => None,
    }
}

// bool < int < float when the numeric values tie
fn kind_rank(v: &Value) -> u8 {
    match v {
        Value::Bool(_) => 0,
        Value::Int(_) => 1,
        _ => 2,
    }
}

fn cmp_numbers(x: Number, y: Number, a: &Value, b: &Value) -> Result<Ordering, SerializationError> {
    let ord = match (x, y) {
        (Number::Int(i), Number::Int(j)) => i.cmp(&j),
        (Number::Float(f), Number::Float(g)) => {
            if f.is_nan() || g.is_nan() {
                return Err(unorderable(a, b));
            }
            f.total_cmp(&g)
        }
        (Number::Int(i), Number::Float(f)) => {
            cmp_int_float(i, f).ok_or_else(|| unorderable(a, b))?
        }
        (Number::Float(f), Number::Int(i)) => {
            cmp_int_float(i, f).ok_or_else(|| unorderable(a, b))?.reverse()
        }
    };
    Ok(ord.then_with(|| kind_rank(a).cmp(&kind_rank(b))))
}

// Exact comparison; `i as f64` rounds above 2^53.
fn cmp_int_float(i: i64, f: f64) -> Option<Ordering> {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

    if f.is_nan() {
        return None;
    }
    if f >= TWO_POW_63 {
        return Some(Ordering::Less);
    }
    if f < -TWO_POW_63 {
        return Some(Ordering::Greater);
    }

    // f is inside the i64 range here, so its integral part converts exactly.
    let whole = f.trunc();
    let ord = i.cmp(&(whole as i64)).then_with(|| {
        if f > whole {
            Ordering::Less
        } else if f < whole {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    });
    Some(ord)
}

fn unorderable(a: &Value, b: &Value) -> SerializationError {
    SerializationError::Unorderable {
        left: a.type_name().to_string(),
        right: b.type_name().to_string(),
    }
}
