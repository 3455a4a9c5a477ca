use crate::models::{AppData, Distraction, Quest};
use crate::storage::Storage;
use crate::utils::format_duration;
use std::fmt::Write;

pub struct Reporter {
    storage: Storage,
}

impl Reporter {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn report(&self) {
        print!("{}", render_report(&self.storage.load_all()));
    }
}

pub fn quest_line(quest: &Quest) -> String {
    format!(
        "[{}] {:>3}%  {}  ({})",
        if quest.completed { "x" } else { " " },
        quest.progress,
        quest.title,
        quest.id
    )
}

pub fn distraction_line(distraction: &Distraction) -> String {
    format!(
        "[{}] {}  ({})",
        if distraction.crossed { "x" } else { " " },
        distraction.text,
        distraction.id
    )
}

pub fn render_report(data: &AppData) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Questclock Report");
    let _ = writeln!(out, "=================");
    let _ = writeln!(
        out,
        "Focus / Rest:        {}m / {}m",
        data.settings.focus_duration_mins, data.settings.rest_duration_mins
    );
    let _ = writeln!(
        out,
        "Lifetime Focus:      {}",
        format_duration(data.total_focus_mins as i64 * 60)
    );

    let completed = data.quests.iter().filter(|q| q.completed).count();
    let _ = writeln!(out, "\nQuests ({}/{} complete)", completed, data.quests.len());
    let _ = writeln!(out, "-------------------------------------------");
    if data.quests.is_empty() {
        let _ = writeln!(out, "No quests yet.");
    } else {
        let avg_progress =
            data.quests.iter().map(|q| u32::from(q.progress)).sum::<u32>() / data.quests.len() as u32;
        for quest in &data.quests {
            let _ = writeln!(out, "{}", quest_line(quest));
        }
        let _ = writeln!(out, "Avg Progress:        {}%", avg_progress);
    }

    let crossed = data.distractions.iter().filter(|d| d.crossed).count();
    let _ = writeln!(
        out,
        "\nDistractions ({}/{} crossed out)",
        crossed,
        data.distractions.len()
    );
    let _ = writeln!(out, "-------------------------------------------");
    if data.distractions.is_empty() {
        let _ = writeln!(out, "No distractions logged.");
    }
    for distraction in &data.distractions {
        let _ = writeln!(out, "{}", distraction_line(distraction));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemId;
    use chrono::Utc;

    #[test]
    fn test_report_empty() {
        let report = render_report(&AppData::default());
        assert!(report.contains("25m / 5m"));
        assert!(report.contains("Lifetime Focus:      0s"));
        assert!(report.contains("No quests yet."));
        assert!(report.contains("No distractions logged."));
    }

    #[test]
    fn test_report_with_items() {
        let now = Utc::now();
        let data = AppData {
            total_focus_mins: 75,
            quests: vec![
                Quest {
                    id: ItemId::from("quest_a"),
                    title: "Write report".to_string(),
                    completed: true,
                    progress: 100,
                    created_at: now,
                },
                Quest {
                    id: ItemId::from("quest_b"),
                    title: "Review PR".to_string(),
                    completed: false,
                    progress: 50,
                    created_at: now,
                },
            ],
            distractions: vec![Distraction {
                id: ItemId::from("distraction_a"),
                text: "phone".to_string(),
                crossed: true,
                created_at: now,
            }],
            ..AppData::default()
        };

        let report = render_report(&data);
        assert!(report.contains("Lifetime Focus:      1h 15m"));
        assert!(report.contains("Quests (1/2 complete)"));
        assert!(report.contains("[x] 100%  Write report  (quest_a)"));
        assert!(report.contains("[ ]  50%  Review PR  (quest_b)"));
        assert!(report.contains("Avg Progress:        75%"));
        assert!(report.contains("Distractions (1/1 crossed out)"));
        assert!(report.contains("[x] phone  (distraction_a)"));
    }
}
