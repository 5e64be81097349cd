//! Operating system and CPU facts.

use sysinfo::System;

use crate::info::report::Entry;

/// System facts the report can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemField {
    Os,
    Cpu,
}

/// Collect the requested fields. Blocking; run it off the async runtime.
pub fn collect(fields: &[SystemField]) -> Vec<Entry> {
    fields
        .iter()
        .map(|field| match field {
            SystemField::Os => Entry::value("OS", os_description()),
            SystemField::Cpu => Entry::value("CPU", cpu_description()),
        })
        .collect()
}

fn os_description() -> String {
    let name = System::long_os_version().unwrap_or_else(|| std::env::consts::OS.to_string());
    match System::kernel_version() {
        Some(kernel) => format!("{name} {kernel}"),
        None => name,
    }
}

fn cpu_description() -> String {
    let mut system = System::new();
    system.refresh_cpu_all();

    let cpus = system.cpus();
    let arch = std::env::consts::ARCH;
    match cpus.first() {
        Some(cpu) => format!("({}) {} {}", cpus.len(), arch, cpu.brand().trim()),
        None => format!("(unknown) {arch}"),
    }
}
