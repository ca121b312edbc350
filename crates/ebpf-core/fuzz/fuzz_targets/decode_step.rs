#![no_main]

use ebpf_core::{disassemble_program, run, Decoder, Machine, RunBoundary};
use libfuzzer_sys::fuzz_target;

const STEP_LIMIT: u64 = 4096;

fuzz_target!(|data: &[u8]| {
    let _ = Decoder::decode(data);
    let _ = disassemble_program(data);

    let Ok(mut machine) = Machine::load(data, 64) else {
        return;
    };
    machine.set_continuous_mode(data.first().is_some_and(|byte| byte & 1 == 1));

    let outcome = run(&mut machine, RunBoundary::StepLimit(STEP_LIMIT));
    assert!(outcome.steps <= STEP_LIMIT);
    assert_eq!(machine.cycle_count(), outcome.steps);
    assert_eq!(machine.instruction_memory(), data);
});
