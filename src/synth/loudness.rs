/// Relative gain compensating for the ear's frequency response, derived from
/// the standard A-weighting transfer function. Only 30% of the correction is
/// applied; this is a partial correction, not loudness normalization.
pub fn equal_loudness_weight(freq_hz: f32) -> f32 {
    let f = f64::from(freq_hz.clamp(20.0, 20_000.0));
    let f2 = f * f;

    // RA(f) from the A-weighting standard.
    let num = 12200.0f64.powi(2) * f2 * f2;
    let den = (f2 + 20.6f64.powi(2))
        * ((f2 + 107.7f64.powi(2)) * (f2 + 737.9f64.powi(2))).sqrt()
        * (f2 + 12200.0f64.powi(2));
    let ra = num / den;

    let a_db = 20.0 * ra.log10() + 2.0;

    10.0f64.powf(-(a_db * 0.3) / 20.0) as f32
}
