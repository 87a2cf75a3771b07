/// Utility functions
use std::f64::consts::PI;

/// Convert RA/Dec (degrees) and distance (parsecs) to scene coordinates
pub fn celestial_to_cartesian(ra_deg: f64, dec_deg: f64, distance_pc: f64) -> [f64; 3] {
    let ra = ra_deg * PI / 180.0;
    let dec = dec_deg * PI / 180.0;

    let x = distance_pc * dec.cos() * ra.cos();
    let y = distance_pc * dec.sin();
    let z = distance_pc * dec.cos() * ra.sin();

    let scale = 0.1;
    [x * scale, y * scale, z * scale]
}

/// Display orbit radius from Kepler's third law, clamped to [2, 50]
pub fn orbital_radius(orbital_period_days: f64, stellar_mass: f64) -> f64 {
    let period_years = orbital_period_days / 365.25;
    let au = (period_years * period_years * stellar_mass).cbrt();
    (au * 5.0).clamp(2.0, 50.0)
}

/// Log-scaled planet size; fixed when scaling is off
pub fn planet_render_size(radius_earth: f64, scaling_enabled: bool) -> f64 {
    if !scaling_enabled {
        return 0.1;
    }
    ((radius_earth + 1.0).log10() * 0.3).clamp(0.05, 1.0)
}

/// Linear marker size for survey scatter views, radius clamped to [0.1, 5.0]
pub fn planet_size(radius_earth: f64) -> f64 {
    0.5 + radius_earth.clamp(0.1, 5.0) * 0.3
}

pub fn star_render_size(radius_solar: f64) -> f64 {
    ((radius_solar + 1.0).log10() * 1.5).clamp(0.2, 3.0)
}

/// Planet color by equilibrium temperature
pub fn planet_color(temperature_k: f64) -> &'static str {
    match temperature_k {
        t if t < 300.0 => "#6366f1",
        t if t < 600.0 => "#10b981",
        t if t < 1000.0 => "#f59e0b",
        t if t < 1500.0 => "#ef4444",
        _ => "#ec4899",
    }
}

/// Insert thousands separators into a non-negative integer string
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_temperature(temperature_k: f64) -> String {
    let rounded = temperature_k.round();
    if !rounded.is_finite() {
        return format!("{} K", rounded);
    }
    let digits = format!("{}", rounded.abs() as u64);
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}{} K", sign, group_thousands(&digits))
}

pub fn format_radius(radius_earth: f64) -> String {
    format!("{:.2} R⊕", radius_earth)
}

pub fn format_mass(mass_earth: f64) -> String {
    format!("{:.2} M⊕", mass_earth)
}

pub fn format_solar_radius(radius_solar: f64) -> String {
    format!("{:.2} R☉", radius_solar)
}

pub fn format_solar_mass(mass_solar: f64) -> String {
    format!("{:.2} M☉", mass_solar)
}

pub fn format_distance(distance_pc: f64) -> String {
    format!("{:.1} pc", distance_pc)
}

pub fn format_period(period_days: f64) -> String {
    format!("{:.2} days", period_days)
}

pub fn format_year(year: i32) -> String {
    year.to_string()
}

/// Fraction in [0, 1] as a percentage
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}
