//! Reference daily shapes and monthly intensity tables.

/// Relative base-load demand per hour: low at night, a breakfast bump and
/// an evening peak from lighting, cooking and appliances.
const BASE_SHAPE_RAW: [f64; 24] = [
    0.55, 0.50, 0.48, 0.47, 0.48, 0.55, 0.80, 1.10, 1.05, 0.90, 0.85, 0.85, //
    0.90, 0.85, 0.80, 0.85, 1.00, 1.30, 1.55, 1.60, 1.50, 1.30, 1.00, 0.75,
];

/// Relative heating demand per hour: deep night setback with steep morning
/// and evening ramps.
const HEATING_SHAPE_RAW: [f64; 24] = [
    0.35, 0.30, 0.30, 0.30, 0.35, 0.70, 1.60, 1.90, 1.60, 1.20, 1.00, 0.90, //
    0.85, 0.85, 0.90, 1.00, 1.25, 1.55, 1.70, 1.60, 1.40, 1.10, 0.70, 0.45,
];

/// Base-load intensity per month (Jan..Dec); mildly higher in summer and December.
pub const BASE_MONTHLY: [f64; 12] = [
    1.05, 1.00, 0.95, 0.92, 0.92, 1.02, 1.05, 1.05, 0.95, 0.97, 1.02, 1.10,
];

/// Heating intensity per month (Jan..Dec); full in January, near zero in summer.
pub const HEATING_MONTHLY: [f64; 12] = [
    1.00, 0.90, 0.75, 0.50, 0.25, 0.08, 0.05, 0.05, 0.20, 0.45, 0.75, 0.95,
];

fn normalized(raw: &[f64; 24]) -> [f64; 24] {
    let sum: f64 = raw.iter().sum();
    raw.map(|v| v / sum)
}

/// Base-load shape normalized to sum to 1.0 over the day.
pub fn base_shape() -> [f64; 24] {
    normalized(&BASE_SHAPE_RAW)
}

/// Heating shape normalized to sum to 1.0 over the day.
pub fn heating_shape() -> [f64; 24] {
    normalized(&HEATING_SHAPE_RAW)
}

/// `factor[month] / mean(factor)` for a 12-month table.
pub fn relative_monthly(table: &[f64; 12], month: usize) -> f64 {
    let mean = table.iter().sum::<f64>() / 12.0;
    table[month] / mean
}
