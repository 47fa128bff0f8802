use console::style;
use dialoguer::Select;

use crate::{
    config::{AurHelper, Choice, DesktopEnvironment, FormSnapshot, InstallType},
    error::AppError,
    ui,
};

/// Asks for the three single-valued selections.
pub fn ask(form: &mut FormSnapshot) -> Result<(), AppError> {
    ui::print_info("Use ↑ ↓ arrow keys to choose, then press Enter. Esc cancels.");
    println!();

    form.desktop_environment =
        select::<DesktopEnvironment>("Desktop environment", &form.desktop_environment)?;
    form.aur_helper = select::<AurHelper>("AUR helper", &form.aur_helper)?;
    form.install_type = select::<InstallType>("Install type", &form.install_type)?;
    Ok(())
}

fn select<C: Choice>(prompt: &str, current: &str) -> Result<String, AppError> {
    let items: Vec<String> = C::ALL
        .iter()
        .map(|c| {
            format!(
                "{}  {}",
                style(format!("{:<10}", c.value())).cyan().bold(),
                style(c.display_name()).dim()
            )
        })
        .collect();

    let idx = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(C::position(current).unwrap_or(0))
        .interact_opt()?
        .ok_or(AppError::Cancelled)?;

    Ok(C::ALL[idx].value().to_string())
}
