use dialoguer::Input;

use crate::{config::FormSnapshot, error::AppError, ui};

/// Asks for the user account and machine name.
///
/// Empty answers are accepted: the generation service decides what is valid.
pub fn ask(form: &mut FormSnapshot) -> Result<(), AppError> {
    ui::print_info("The account created on the new system and its network name.");
    println!();

    form.username = text("Username", &form.username)?;
    form.hostname = text("Hostname", &form.hostname)?;
    Ok(())
}

pub(crate) fn text(prompt: &str, current: &str) -> Result<String, AppError> {
    let mut input = Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true);
    if !current.is_empty() {
        input = input.with_initial_text(current);
    }
    Ok(input.interact_text()?)
}
