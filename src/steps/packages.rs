use console::style;
use dialoguer::MultiSelect;

use crate::{
    config::{FormSnapshot, OPTIONAL_PACKAGES},
    error::AppError,
    ui,
};

/// Lets the user tick optional packages. Only the presented toggles
/// can end up checked.
pub fn ask(form: &mut FormSnapshot) -> Result<(), AppError> {
    ui::print_info("Space toggles a package, Enter confirms.");
    println!();

    let items: Vec<String> = form
        .optional_packages
        .iter()
        .map(|toggle| {
            let description = OPTIONAL_PACKAGES
                .iter()
                .find(|(value, _)| *value == toggle.value)
                .map_or("", |(_, d)| *d);
            format!(
                "{}  {}",
                style(format!("{:<18}", toggle.value)).cyan().bold(),
                style(description).dim()
            )
        })
        .collect();
    let checked: Vec<bool> = form.optional_packages.iter().map(|t| t.checked).collect();

    let picked = MultiSelect::new()
        .with_prompt("Optional packages")
        .items(&items)
        .defaults(&checked)
        .interact()?;

    for (i, toggle) in form.optional_packages.iter_mut().enumerate() {
        toggle.checked = picked.contains(&i);
    }

    let count = picked.len();
    ui::print_info(&format!(
        "{} optional package{} selected.",
        count,
        if count == 1 { "" } else { "s" }
    ));
    Ok(())
}
