use anstyle::AnsiColor;
use anstyle::Color;
use anstyle::Style;

/// The line that opens the launch configuration block in a script.
pub const CONFIG_BEGIN_MARKER: &str = "# === relaunch config ===";

/// The line that closes the launch configuration block in a script.
pub const CONFIG_END_MARKER: &str = "# === end relaunch config ===";

/// The accelerators available on every node of the reference deployment.
///
/// Deployments with a different node shape override this in one place
/// rather than at every use site.
pub const ACCELERATORS_PER_NODE: u64 = 8;

/// The external tool that snapshots the code tree.
///
/// It takes an experiment name, copies the working tree to an immutable
/// directory, and prints that directory on stdout.
pub const SNAPSHOT_COMMAND: &str = "code-snapshot";

/// The dependency-install step run inside the allocation before the script.
///
/// Kept for container images that predate baked-in dependencies.
pub const INSTALL_STEP: &str = "uv sync --inexact";

/// The experiment-tracking project under which release runs are grouped.
pub const RELEASE_PROJECT: &str = "release-runs";

/// Create a style with a defined foreground color.
pub const fn style_from_fg(color: AnsiColor) -> Style {
    Style::new().fg_color(Some(Color::Ansi(color)))
}

/// The styling for the program name.
pub const PRIMARY_STYLE: Style = style_from_fg(AnsiColor::Green).bold();

/// The styling for error messages.
pub const ERROR_STYLE: Style = style_from_fg(AnsiColor::Red).bold().blink();

/// The styling for help messages.
pub const HELP_STYLE: Style = style_from_fg(AnsiColor::Green).bold().underline();
