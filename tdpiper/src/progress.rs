use std::ops::{Add, AddAssign};


#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ProgressRecord {
    pub lines_emitted: usize,
    pub commands_run: usize,
    pub commands_skipped: usize,
    pub commands_failed: usize,
}

impl Add for ProgressRecord {
    type Output = ProgressRecord;

    fn add(self, rhs: Self) -> Self::Output {
        let mut dup = self.clone();
        dup += rhs;
        dup
    }
}

impl AddAssign for ProgressRecord {
    fn add_assign(&mut self, rhs: Self) {
        self.lines_emitted += rhs.lines_emitted;
        self.commands_run += rhs.commands_run;
        self.commands_skipped += rhs.commands_skipped;
        self.commands_failed += rhs.commands_failed;
    }
}
