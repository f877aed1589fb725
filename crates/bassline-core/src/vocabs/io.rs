use crate::interpreter::{console::ConsoleLevel, errors::Result, word::WordBody, Interpreter};

pub fn create_io_vocab(rt: &mut Interpreter) -> Result<()> {
    rt.with_vocabulary("io", |rt| {
        rt.def(".log", WordBody::sync(|rt| write(rt, ".log", ConsoleLevel::Log)), false)?;
        rt.def(".error", WordBody::sync(|rt| write(rt, ".error", ConsoleLevel::Error)), false)?;
        rt.def(".warn", WordBody::sync(|rt| write(rt, ".warn", ConsoleLevel::Warn)), false)?;
        Ok(())
    })
}

fn write(rt: &mut Interpreter, word: &str, level: ConsoleLevel) -> Result<()> {
    let message = rt.pop(word)?.to_display_string();
    let console = rt.console();
    match level {
        ConsoleLevel::Log => console.log(&message),
        ConsoleLevel::Error => console.error(&message),
        ConsoleLevel::Warn => console.warn(&message),
    }
    Ok(())
}
