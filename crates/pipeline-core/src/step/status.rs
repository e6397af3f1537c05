/// Estado de una tarea reconstruido por replay.
///
/// `Pending -> Running -> FinishedOk | Failed`. Un `Failed` detiene el
/// workflow; no hay reintentos ni vuelta atrás.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    /// Arrancó y todavía no registró resultado (o la ejecución se cortó).
    Running,
    FinishedOk,
    Failed,
}

impl StepStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, StepStatus::FinishedOk | StepStatus::Failed)
    }

    /// Sólo una tarea terminada con éxito deja avanzar el cursor.
    pub fn is_success(self) -> bool {
        self == StepStatus::FinishedOk
    }
}

#[cfg(test)]
mod tests {
    use super::StepStatus;

    #[test]
    fn only_finished_tasks_are_terminal() {
        assert!(!StepStatus::Pending.is_terminal());
        assert!(!StepStatus::Running.is_terminal());
        assert!(StepStatus::Failed.is_terminal() && !StepStatus::Failed.is_success());
        assert!(StepStatus::FinishedOk.is_success());
    }
}
