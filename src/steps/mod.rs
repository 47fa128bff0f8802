pub mod desktop;
pub mod identity;
pub mod locale;
pub mod packages;

use dialoguer::Confirm;

use crate::{config::FormSnapshot, error::AppError, ui};

pub const TOTAL_STEPS: u8 = 4;

/// Walks the user through every form step, starting from `defaults`.
/// Loops until the user accepts the summary.
pub fn collect(defaults: FormSnapshot) -> Result<FormSnapshot, AppError> {
    let mut form = defaults;

    loop {
        ui::print_step(1, TOTAL_STEPS, "Identity");
        identity::ask(&mut form)?;

        ui::print_step(2, TOTAL_STEPS, "Locale");
        locale::ask(&mut form)?;

        ui::print_step(3, TOTAL_STEPS, "Desktop & Install Type");
        desktop::ask(&mut form)?;

        ui::print_step(4, TOTAL_STEPS, "Optional Packages");
        packages::ask(&mut form)?;

        print_summary(&form);

        if Confirm::new()
            .with_prompt("Generate setup.conf with these answers?")
            .default(true)
            .interact()?
        {
            return Ok(form);
        }

        ui::print_info("Going through the form again with your answers pre-filled.");
    }
}

fn print_summary(form: &FormSnapshot) {
    let packages: Vec<&str> = form
        .optional_packages
        .iter()
        .filter(|t| t.checked)
        .map(|t| t.value.as_str())
        .collect();
    let packages = if packages.is_empty() {
        "—".to_string()
    } else {
        packages.join(", ")
    };

    println!();
    ui::print_kv_box(
        "Your answers",
        &[
            ("username", form.username.as_str()),
            ("hostname", form.hostname.as_str()),
            ("timezone", form.timezone.as_str()),
            ("keymap", form.keymap.as_str()),
            ("desktop_environment", form.desktop_environment.as_str()),
            ("aur_helper", form.aur_helper.as_str()),
            ("install_type", form.install_type.as_str()),
            ("optional_packages", packages.as_str()),
        ],
    );
    println!();
}
