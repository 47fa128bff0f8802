use crate::{config::FormSnapshot, error::AppError, steps::identity::text, ui};

/// Asks for the timezone and console keymap identifiers.
pub fn ask(form: &mut FormSnapshot) -> Result<(), AppError> {
    ui::print_kv_box(
        "Examples",
        &[
            ("timezone", "UTC, Europe/Berlin, America/New_York"),
            ("keymap", "us, de-latin1, fr, uk"),
        ],
    );
    println!();

    form.timezone = text("Timezone", &form.timezone)?;
    form.keymap = text("Keymap", &form.keymap)?;
    Ok(())
}
