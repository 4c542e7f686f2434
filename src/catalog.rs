/// Symbols offered by the instrument picker when nothing else is configured.
pub const DEFAULT_INSTRUMENTS: &[&str] = &[
    "NIFTY",
    "BANKNIFTY",
    "FINNIFTY",
    "SENSEX",
    "LICHSGFIN",
    "DABUR",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    symbols: Vec<String>,
}

impl Catalog {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for s in symbols {
            let sym = normalize_symbol(s.as_ref());
            if !sym.is_empty() && !out.contains(&sym) {
                out.push(sym);
            }
        }
        Self { symbols: out }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn contains(&self, symbol: &str) -> bool {
        let sym = normalize_symbol(symbol);
        self.symbols.iter().any(|s| *s == sym)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(DEFAULT_INSTRUMENTS)
    }
}

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
