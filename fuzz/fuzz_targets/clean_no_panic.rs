// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use libfuzzer_sys::fuzz_target;
use vitals_clean::{CleaningConfig, CleaningPipeline};
use vitals_core::ReadingTensor;

fn build_value(mode_seed: u8, raw_seed: i16) -> f64 {
    match mode_seed % 6 {
        0 | 1 => f64::from(raw_seed),
        2 => f64::from(raw_seed) * 1_000.0,
        3 => f64::NAN,
        4 => 0.0,
        _ => f64::from(raw_seed) / 7.0,
    }
}

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);
    let users = common::bounded(cursor.next_u8(), 1, 8);
    let days = common::bounded(cursor.next_u8(), 1, 16);
    let fence = 0.1 + f64::from(cursor.next_u8()) / 32.0;

    let mut values = Vec::with_capacity(users * days * 4);
    for _ in 0..users * days * 4 {
        if cursor.remaining() == 0 {
            values.push(f64::NAN);
            continue;
        }
        values.push(build_value(cursor.next_u8(), cursor.next_i16()));
    }

    let readings = ReadingTensor::new(values, users, days).expect("fuzz tensor shape is valid");
    let pipeline =
        CleaningPipeline::new(CleaningConfig { iqr_fence: fence }).expect("fuzz fence is valid");
    if let Ok(cleaned) = pipeline.apply(&readings) {
        assert!(cleaned.readings.is_complete());
        assert_eq!(cleaned.readings.shape(), readings.shape());
    }
});
