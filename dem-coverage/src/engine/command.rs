//! Exécution bloquante des outils en ligne de commande

use std::process::Command;

use tracing::debug;

use super::EngineError;

/// Lance un programme et vérifie son code de retour
///
/// La sortie d'erreur est capturée et jointe à l'erreur en cas d'échec.
pub fn run(program: &str, args: &[String]) -> Result<(), EngineError> {
    let command_line = command_line(program, args);
    debug!(command = %command_line, "Running external engine");

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| EngineError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(EngineError::Failed {
            command: command_line,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

/// Ligne de commande lisible (pour les logs et les erreurs)
pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let args = vec!["-i".to_string(), "10".to_string()];
        assert_eq!(command_line("gdal_contour", &args), "gdal_contour -i 10");
    }

    #[test]
    fn test_missing_program() {
        let result = run("dem-coverage-no-such-program", &[]);
        assert!(matches!(result, Err(EngineError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_error() {
        let args = vec!["-c".to_string(), "echo boom >&2; exit 3".to_string()];
        match run("sh", &args) {
            Err(EngineError::Failed { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_success() {
        assert!(run("true", &[]).is_ok());
    }
}
