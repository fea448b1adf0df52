/// Families of high-frequency progress lines the external tools print
/// while iterating over spectra. Lines in these families are throttled
/// before reaching the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    /// TopFD per-scan and per-feature percentage lines.
    SpectrumScan,
    /// TopPIC mass shift filtering/search percentage lines.
    ShiftSearch,
}

impl ProgressKind {
    pub fn matches(&self, line: &str) -> bool {
        match self {
            ProgressKind::SpectrumScan => {
                line.contains('%')
                    && (line.contains("Processing MS1 spectrum scan")
                        || line.contains("Processing feature")
                        || line.contains("Additional feature search MS1 spectrum scan")
                        || line.contains("Processing MS/MS spectrum scan"))
            }
            ProgressKind::ShiftSearch => {
                (line.contains("unexpected shift filtering - processing") && line.contains('%'))
                    || line.contains("unexpected shift search - processing")
            }
        }
    }

    pub const fn default_gap(&self) -> usize {
        match self {
            ProgressKind::SpectrumScan => 500,
            ProgressKind::ShiftSearch => 20000,
        }
    }
}

/// Suppresses runs of matching progress lines, letting one through
/// every `gap` occurrences. Lines outside the progress family always
/// pass and reset the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineThrottle {
    kind: Option<ProgressKind>,
    gap: usize,
    count: usize,
}

impl LineThrottle {
    pub fn new(kind: Option<ProgressKind>, gap: usize) -> Self {
        Self {
            kind,
            gap,
            count: 0,
        }
    }

    /// Whether `line` should be emitted.
    pub fn admit(&mut self, line: &str) -> bool {
        let matched = match self.kind {
            Some(kind) if self.gap > 0 => kind.matches(line),
            _ => false,
        };
        if !matched {
            self.count = 0;
            return true;
        }
        let emit = self.count % self.gap == 0;
        self.count += 1;
        emit
    }
}
