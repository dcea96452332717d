#![no_main]
use bescan_core::{MemorySource, PartitionPlan, ScanConfig, ScanMode, Scanner};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&w, body)) = data.split_first() else {
        return;
    };
    let workers = usize::from(w % 16) + 1;

    let plan = PartitionPlan::new(body.len() as u64, workers).unwrap();
    assert!(plan.is_well_formed());

    let src = MemorySource::new(body.to_vec());
    let cfg = ScanConfig { workers, block_size: 8, ..ScanConfig::default() };
    let s = Scanner::new(cfg).unwrap();
    let seq = s.scan_source(&src, ScanMode::Sequential).unwrap();
    let par = s.scan_source(&src, ScanMode::Parallel).unwrap();
    assert_eq!(seq.accumulator, par.accumulator);
});
