//! Checklist progress per onboarding stage.

use serde::{Deserialize, Serialize};

use crate::model::{Stage, Task, TaskId};

/// Derived completion figures for one stage. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProgress {
    pub total: u32,
    pub completed: u32,
    pub percentage: u8,
}

/// Completion across all three stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallProgress {
    pub total: u32,
    pub completed: u32,
    pub percentage: u8,
    pub first_day: StageProgress,
    pub first_week: StageProgress,
    pub first_month: StageProgress,
}

impl OverallProgress {
    #[must_use]
    pub fn stage(&self, stage: Stage) -> StageProgress {
        match stage {
            Stage::FirstDay => self.first_day,
            Stage::FirstWeek => self.first_week,
            Stage::FirstMonth => self.first_month,
        }
    }
}

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0.
#[must_use]
pub fn percentage(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let rounded = (part.saturating_mul(200) + whole) / whole.saturating_mul(2);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

/// Overlay saved completion state onto the canonical template.
///
/// The result always has the template's length and order. Saved tasks whose
/// id is not in the template are dropped.
#[must_use]
pub fn merge_with_template(template: &[Task], saved: &[Task]) -> Vec<Task> {
    template
        .iter()
        .map(|default| {
            saved
                .iter()
                .find(|task| task.id == default.id)
                .unwrap_or(default)
                .clone()
        })
        .collect()
}

/// Progress of a stage's task list.
///
/// An empty list is measured against `expected_total`. A non-empty list is
/// measured against its own length, even if the template has since changed.
#[must_use]
pub fn compute_stage_progress(tasks: &[Task], expected_total: u32) -> StageProgress {
    let completed = count_u32(tasks.iter().filter(|t| t.completed).count());
    let total = if tasks.is_empty() {
        expected_total
    } else {
        count_u32(tasks.len())
    };
    StageProgress {
        total,
        completed,
        percentage: percentage(u64::from(completed), u64::from(total)),
    }
}

#[must_use]
pub fn compute_overall_progress(
    first_day: StageProgress,
    first_week: StageProgress,
    first_month: StageProgress,
) -> OverallProgress {
    let total = first_day.total + first_week.total + first_month.total;
    let completed = first_day.completed + first_week.completed + first_month.completed;
    OverallProgress {
        total,
        completed,
        percentage: percentage(u64::from(completed), u64::from(total)),
        first_day,
        first_week,
        first_month,
    }
}

/// Flip the completion flag of task `id`. Returns `false` if no task has that id.
pub fn toggle(tasks: &mut [Task], id: TaskId) -> bool {
    match tasks.iter_mut().find(|t| t.id == id) {
        Some(task) => {
            task.completed = !task.completed;
            true
        }
        None => false,
    }
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Template and fallback denominator for one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageConfig {
    pub template: Vec<Task>,
    pub expected_total: u32,
}

impl StageConfig {
    /// Uses the template's length as the fallback denominator.
    #[must_use]
    pub fn from_template(template: Vec<Task>) -> Self {
        let expected_total = count_u32(template.len());
        Self {
            template,
            expected_total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressConfig {
    pub first_day: StageConfig,
    pub first_week: StageConfig,
    pub first_month: StageConfig,
}

impl ProgressConfig {
    #[must_use]
    pub fn stage(&self, stage: Stage) -> &StageConfig {
        match stage {
            Stage::FirstDay => &self.first_day,
            Stage::FirstWeek => &self.first_week,
            Stage::FirstMonth => &self.first_month,
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            first_day: StageConfig::from_template(first_day_template()),
            first_week: StageConfig::from_template(first_week_template()),
            first_month: StageConfig::from_template(first_month_template()),
        }
    }
}

/// Stage-aware front for the progress functions.
#[derive(Debug, Clone, Default)]
pub struct ProgressAggregator {
    config: ProgressConfig,
}

impl ProgressAggregator {
    #[must_use]
    pub fn new(config: ProgressConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ProgressConfig {
        &self.config
    }

    #[must_use]
    pub fn template(&self, stage: Stage) -> &[Task] {
        &self.config.stage(stage).template
    }

    /// Checklist to display for `stage`, given what storage returned.
    #[must_use]
    pub fn merge(&self, stage: Stage, saved: Option<&[Task]>) -> Vec<Task> {
        merge_with_template(self.template(stage), saved.unwrap_or_default())
    }

    #[must_use]
    pub fn stage_progress(&self, stage: Stage, saved: Option<&[Task]>) -> StageProgress {
        compute_stage_progress(
            saved.unwrap_or_default(),
            self.config.stage(stage).expected_total,
        )
    }

    /// Overall progress from each stage's saved list (absent means nothing saved).
    #[must_use]
    pub fn overall(
        &self,
        first_day: Option<&[Task]>,
        first_week: Option<&[Task]>,
        first_month: Option<&[Task]>,
    ) -> OverallProgress {
        compute_overall_progress(
            self.stage_progress(Stage::FirstDay, first_day),
            self.stage_progress(Stage::FirstWeek, first_week),
            self.stage_progress(Stage::FirstMonth, first_month),
        )
    }
}

#[must_use]
pub fn first_day_template() -> Vec<Task> {
    vec![
        Task::pending(1, "Configurar acesso ao sistema"),
        Task::pending(2, "Revisar documentação da empresa"),
        Task::pending(3, "Configurar email corporativo"),
        Task::pending(4, "Participar da reunião de boas-vindas"),
        Task::pending(5, "Conhecer a equipe"),
    ]
}

#[must_use]
pub fn first_week_template() -> Vec<Task> {
    vec![
        Task::pending(1, "Completar treinamento inicial obrigatório"),
        Task::pending(2, "Configurar ferramentas de desenvolvimento"),
        Task::pending(3, "Participar das reuniões semanais da equipe"),
        Task::pending(4, "Revisar processos e procedimentos internos"),
        Task::pending(5, "Configurar acesso a sistemas e aplicativos"),
        Task::pending(6, "Agendar reunião 1:1 com o gestor"),
        Task::pending(7, "Conhecer os principais projetos em andamento"),
    ]
}

#[must_use]
pub fn first_month_template() -> Vec<Task> {
    vec![
        Task::pending(1, "Completar todos os treinamentos obrigatórios"),
        Task::pending(2, "Entregar primeiro projeto ou tarefa significativa"),
        Task::pending(3, "Estabelecer relacionamentos com colegas de diferentes departamentos"),
        Task::pending(4, "Participar ativamente das reuniões e contribuir com ideias"),
        Task::pending(5, "Revisar e entender os objetivos estratégicos da empresa"),
        Task::pending(6, "Configurar e otimizar ambiente de trabalho"),
        Task::pending(7, "Receber feedback formal do gestor sobre o primeiro mês"),
        Task::pending(8, "Definir metas e objetivos para os próximos meses"),
        Task::pending(9, "Completar avaliação de desempenho inicial"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks(flags: &[bool]) -> Vec<Task> {
        flags
            .iter()
            .enumerate()
            .map(|(i, done)| {
                Task::pending(u32::try_from(i).unwrap() + 1, format!("t{i}")).with_completed(*done)
            })
            .collect()
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(7, 7), 100);
    }

    #[test]
    fn empty_stage_is_zero_percent() {
        let progress = compute_stage_progress(&[], 5);
        assert_eq!(progress, StageProgress { total: 5, completed: 0, percentage: 0 });
        assert_eq!(compute_stage_progress(&[], 0).percentage, 0);
    }

    #[test]
    fn three_of_five_is_sixty_percent() {
        let progress = compute_stage_progress(&tasks(&[true, true, true, false, false]), 5);
        assert_eq!(progress.completed, 3);
        assert_eq!(progress.percentage, 60);
    }

    #[test]
    fn saved_list_length_wins_over_expected_total() {
        // A list saved before the template grew keeps its own denominator.
        let progress = compute_stage_progress(&tasks(&[true, true, false, false]), 5);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.percentage, 50);
    }

    #[test]
    fn merge_keeps_template_order_and_length() {
        let template = first_day_template();
        let saved = vec![
            Task::pending(5, "Conhecer a equipe").with_completed(true),
            Task::pending(42, "Stale task").with_completed(true),
            Task::pending(2, "old wording").with_completed(true),
        ];
        let merged = merge_with_template(&template, &saved);

        assert_eq!(merged.len(), template.len());
        let ids: Vec<u32> = merged.iter().map(|t| t.id.value()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert!(merged[1].completed);
        assert_eq!(merged[1].description, "old wording");
        assert!(merged[4].completed);
        assert!(!merged[0].completed);
    }

    #[test]
    fn merge_with_nothing_saved_is_the_template() {
        let template = first_week_template();
        assert_eq!(merge_with_template(&template, &[]), template);
    }

    #[test]
    fn overall_sums_stage_totals() {
        let aggregator = ProgressAggregator::default();
        let day = tasks(&[true, true, true, true, true]);
        let week = tasks(&[true, false, false, false, false, false, false]);
        let overall = aggregator.overall(Some(&day), Some(&week), None);

        assert_eq!(overall.total, 5 + 7 + 9);
        assert_eq!(overall.completed, 6);
        assert_eq!(overall.percentage, 29);
        assert_eq!(overall.first_day.percentage, 100);
        assert_eq!(overall.first_week.percentage, 14);
        assert_eq!(overall.stage(Stage::FirstMonth).total, 9);
    }

    #[test]
    fn default_config_uses_five_seven_nine() {
        let config = ProgressConfig::default();
        assert_eq!(config.stage(Stage::FirstDay).expected_total, 5);
        assert_eq!(config.stage(Stage::FirstWeek).expected_total, 7);
        assert_eq!(config.stage(Stage::FirstMonth).expected_total, 9);
    }

    #[test]
    fn toggle_flips_known_task_only() {
        let mut list = first_day_template();
        assert!(toggle(&mut list, TaskId::new(3)));
        assert!(list[2].completed);
        assert!(toggle(&mut list, TaskId::new(3)));
        assert!(!list[2].completed);
        assert!(!toggle(&mut list, TaskId::new(99)));
    }
}
