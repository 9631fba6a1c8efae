//! Shell completion generation for specomp
//!
//! Prints the clap-generated script for specomp itself, followed by a bridge
//! that completes the bundled `jenv` grammar by calling `specomp complete`.

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::CliArgs;
use crate::error::{Result, SpecompError};

/// Generate shell completion script
///
/// # Arguments
/// * `shell_name` - Shell type (bash, zsh, fish)
pub fn generate_completion(shell_name: &str) -> Result<()> {
    print!("{}", completion_script(shell_name)?);
    Ok(())
}

/// Build the completion script for `shell_name`
pub fn completion_script(shell_name: &str) -> Result<String> {
    let shell = parse_shell(shell_name)?;

    let mut cmd = CliArgs::command();
    let mut buffer = Vec::new();
    generate(shell, &mut cmd, "specomp", &mut buffer);
    let basic_completion = String::from_utf8_lossy(&buffer);

    let bridge = match shell {
        Shell::Bash => BASH_BRIDGE,
        Shell::Zsh => ZSH_BRIDGE,
        _ => FISH_BRIDGE,
    };
    Ok(format!("{}\n{}", basic_completion, bridge))
}

/// Parse shell name string to Shell enum
fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        _ => Err(SpecompError::Generic(format!(
            "Unsupported shell: {}. Supported shells: bash, zsh, fish",
            shell_name
        ))),
    }
}

const BASH_BRIDGE: &str = r#"
# Complete jenv through specomp
_specomp_jenv() {
    local IFS=$'\n'
    COMPREPLY=($(specomp --no-color --format text complete --index "$COMP_CWORD" -- "${COMP_WORDS[@]}" 2>/dev/null | cut -f1))
}
complete -o nospace -F _specomp_jenv jenv
"#;

const ZSH_BRIDGE: &str = r#"
# Complete jenv through specomp
_specomp_jenv() {
    local -a candidates
    candidates=(${(f)"$(specomp --no-color --format text complete --index $((CURRENT - 1)) -- "${words[@]}" 2>/dev/null | sed 's/\t/:/')"})
    _describe 'jenv' candidates
}
compdef _specomp_jenv jenv
"#;

const FISH_BRIDGE: &str = r#"
# Complete jenv through specomp
function __specomp_jenv
    set -l prior (commandline -opc)
    set -l current (commandline -ct)
    specomp --no-color --format text complete --index (count $prior) -- $prior "$current" 2>/dev/null
end
complete -c jenv -f -a "(__specomp_jenv)"
"#;
