//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::pallas;
use std::fmt;

/// The memory and cpu budget of one script execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionUnits {
    mem: u64,
    cpu: u64,
}

impl fmt::Display for ExecutionUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mem={} cpu={}", self.mem, self.cpu)
    }
}

impl ExecutionUnits {
    pub fn new(mem: u64, cpu: u64) -> Self {
        Self { mem, cpu }
    }

    pub fn mem(&self) -> u64 {
        self.mem
    }

    pub fn cpu(&self) -> u64 {
        self.cpu
    }
}

impl From<ExecutionUnits> for pallas::ExUnits {
    fn from(ex_units: ExecutionUnits) -> Self {
        pallas::ExUnits {
            mem: ex_units.mem,
            steps: ex_units.cpu,
        }
    }
}

impl From<&pallas::ExUnits> for ExecutionUnits {
    fn from(ex_units: &pallas::ExUnits) -> Self {
        Self::new(ex_units.mem, ex_units.steps)
    }
}
