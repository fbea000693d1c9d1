use rand::{Rng, rngs::OsRng};
use parking_lot::Mutex;

///
/// Produces the numeric one-time codes sent for password resets.
///
pub trait CodeGenerator: Send + Sync {
    fn generate(&self, length: usize) -> String;
}

///
/// Draws each digit uniformly from the operating system's CSPRNG, so a code of n digits has
/// 10^n equally likely values.
///
#[derive(Debug, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self, length: usize) -> String {
        let mut rng = OsRng;
        (0..length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }
}

///
/// Hands out a fixed sequence of codes, repeating the last one once exhausted. Lets tests
/// know which code was issued without reading the notifier.
///
#[derive(Debug)]
pub struct FixedCodeGenerator {
    codes: Mutex<Vec<String>>,
}

impl FixedCodeGenerator {
    pub fn new(codes: &[&str]) -> Self {
        let mut codes: Vec<String> = codes.iter().map(|code| code.to_string()).collect();
        codes.reverse();
        FixedCodeGenerator { codes: Mutex::new(codes) }
    }
}

impl CodeGenerator for FixedCodeGenerator {
    fn generate(&self, length: usize) -> String {
        let mut codes = self.codes.lock();
        match codes.len() {
            0 => "0".repeat(length),
            1 => codes[0].clone(),
            _ => codes.pop().unwrap_or_default(),
        }
    }
}
