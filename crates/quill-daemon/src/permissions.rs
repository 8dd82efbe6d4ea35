//! Pre-flight checks for the global input hook.

use quill_core::Result;

/// Warn about missing OS-level permissions before attaching the hook.
///
/// None of these are fatal here; the listener itself retries and reports,
/// but telling the user up front saves a confusing silent failure.
pub fn check_permissions() -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        println!("quill monitors keyboard input to detect snippet triggers.");
        println!("If expansion does not work, grant Accessibility and Input");
        println!("Monitoring permission to your terminal under:");
        println!("  System Settings > Privacy & Security > Accessibility");
    }

    #[cfg(target_os = "linux")]
    {
        if !has_input_access() {
            println!("quill could not read /dev/input; keyboard monitoring may fail.");
            println!("Add your user to the 'input' group and log in again:");
            println!("  sudo usermod -aG input $USER");
        }
    }

    Ok(())
}

#[cfg(target_os = "linux")]
fn has_input_access() -> bool {
    match std::fs::read_dir("/dev/input") {
        Ok(mut entries) => entries.any(|entry| {
            entry
                .map(|e| std::fs::File::open(e.path()).is_ok())
                .unwrap_or(false)
        }),
        Err(_) => false,
    }
}
