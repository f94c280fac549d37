//! Console report around a single answer

use crate::invoker::InvocationResult;
use std::io::{self, Write};

/// Width of the `=` rules framing each banner
pub const RULE_WIDTH: usize = 70;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Banner and question, printed before the model is called
pub fn write_header<W: Write>(out: &mut W, question: &str) -> io::Result<()> {
    let rule = rule();
    writeln!(out)?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "🤖 Personal Agent Twin - Ready to answer questions about you!")?;
    writeln!(out, "{}", rule)?;
    writeln!(out)?;
    writeln!(out, "❓ Question: {}", question)?;
    writeln!(out)?;
    Ok(())
}

/// The answer under its own banner
pub fn write_answer<W: Write>(out: &mut W, result: &InvocationResult) -> io::Result<()> {
    let rule = rule();
    writeln!(out)?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "✅ Agent Response:")?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "{}", result)?;
    writeln!(out)?;
    writeln!(out)?;
    out.flush()
}
