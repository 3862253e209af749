use rand::Rng;
use serde_json::{json, Value};

/// Sampled readings mimic what the station firmware reports: plausible
/// ranges, two decimal places, no timestamp (the bridge stamps arrival time).
pub fn sample_bmp280(rng: &mut impl Rng) -> Value {
    json!({
        "temperature": round2(rng.gen_range(20.0..35.0)),
        "pressure": round2(rng.gen_range(1000.0..1020.0)),
        "altitude": round2(rng.gen_range(0.0..200.0)),
    })
}

pub fn sample_aht10(rng: &mut impl Rng) -> Value {
    json!({
        "temperature": round2(rng.gen_range(18.0..32.0)),
        "humidity": round2(rng.gen_range(30.0..90.0)),
    })
}

pub fn sample_battery(rng: &mut impl Rng) -> Value {
    json!({
        "battery_voltage": round2(rng.gen_range(3.0..4.2)),
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmp280_samples_stay_in_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let sample = sample_bmp280(&mut rng);
            let temperature = sample["temperature"].as_f64().unwrap();
            let pressure = sample["pressure"].as_f64().unwrap();
            let altitude = sample["altitude"].as_f64().unwrap();
            assert!((20.0..=35.0).contains(&temperature));
            assert!((1000.0..=1020.0).contains(&pressure));
            assert!((0.0..=200.0).contains(&altitude));
        }
    }

    #[test]
    fn aht10_samples_stay_in_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let sample = sample_aht10(&mut rng);
            let temperature = sample["temperature"].as_f64().unwrap();
            let humidity = sample["humidity"].as_f64().unwrap();
            assert!((18.0..=32.0).contains(&temperature));
            assert!((30.0..=90.0).contains(&humidity));
        }
    }

    #[test]
    fn battery_samples_stay_in_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let voltage = sample_battery(&mut rng)["battery_voltage"].as_f64().unwrap();
            assert!((3.0..=4.2).contains(&voltage));
        }
    }

    #[test]
    fn samples_are_rounded_to_two_decimals() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let v = sample_battery(&mut rng)["battery_voltage"].as_f64().unwrap();
            assert_eq!((v * 100.0).round() / 100.0, v);
        }
    }
}
