use crate::Channel;

/// ADC codes per volt: 10-bit converter against a 1.8 V reference.
const CODES_PER_VOLT: f64 = 1024.0 / 1.8;

/// Convert a raw ADC code into the rail voltage in front of the channel's divider.
///
/// `voltage = (raw + 1) * (r1 + r2) / ((1024 / 1.8) * r2)`, with `r2 == 0` treated as 1 in
/// the denominator. The `+ 1` offset is part of the board calibration and must stay.
pub fn convert(channel: &Channel, raw: i64) -> f64 {
    let denominator = if channel.r2 == 0.0 { 1.0 } else { channel.r2 };
    (raw as f64 + 1.0) * (channel.r1 + channel.r2) / (CODES_PER_VOLT * denominator)
}
