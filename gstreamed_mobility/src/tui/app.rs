use std::path::PathBuf;

use anyhow::Result;
use mobility_common::arena::ArenaZone;
use mobility_common::config::AnalysisConfig;
use mobility_common::palette;

/// Editable fields of a zone, cycled with Tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Left,
    Top,
    Right,
    Bottom,
    Rotation,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Left,
        Field::Top,
        Field::Right,
        Field::Bottom,
        Field::Rotation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Left => "Left",
            Field::Top => "Top",
            Field::Right => "Right",
            Field::Bottom => "Bottom",
            Field::Rotation => "Rotation",
        }
    }

    pub fn next(self) -> Field {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Field {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Rename { buffer: String },
}

/// Zone editor state. Key handling mutates this; `ui::draw` renders it.
pub struct EditorApp {
    pub config: AnalysisConfig,
    pub config_path: PathBuf,
    /// Video dimensions bounding zone coordinates, when known.
    pub frame_dims: Option<(u32, u32)>,
    pub selected: usize,
    pub field: Field,
    pub mode: Mode,
    pub dirty: bool,
    pub status: String,
    should_quit: bool,
}

impl EditorApp {
    pub fn new(
        config: AnalysisConfig,
        config_path: PathBuf,
        frame_dims: Option<(u32, u32)>,
    ) -> Self {
        let mut config = config;
        config.assign_colors();
        Self {
            config,
            config_path,
            frame_dims,
            selected: 0,
            field: Field::Left,
            mode: Mode::Browse,
            dirty: false,
            status: String::from("Arrows nudge, Tab cycles field, s saves, q quits"),
            should_quit: false,
        }
    }

    pub fn selected_zone(&self) -> Option<&ArenaZone> {
        self.config.frames.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.config.frames.is_empty() {
            self.selected = (self.selected + 1) % self.config.frames.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.config.frames.is_empty() {
            let len = self.config.frames.len();
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn next_field(&mut self) {
        self.field = self.field.next();
    }

    pub fn prev_field(&mut self) {
        self.field = self.field.prev();
    }

    /// Adjust the active field of the selected zone by `delta`.
    pub fn nudge(&mut self, delta: i32) {
        let field = self.field;
        let Some(zone) = self.config.frames.get_mut(self.selected) else {
            return;
        };
        match field {
            Field::Left => zone.top_left[0] += delta,
            Field::Top => zone.top_left[1] += delta,
            Field::Right => zone.bottom_right[0] += delta,
            Field::Bottom => zone.bottom_right[1] += delta,
            Field::Rotation => zone.rotation += delta as f32,
        }
        self.dirty = true;
    }

    /// Add a new zone with default geometry around the frame centre.
    pub fn add_zone(&mut self) {
        let (w, h) = self
            .frame_dims
            .unwrap_or((self.config.window_width, self.config.window_height));
        let (cx, cy) = (w as i32 / 2, h as i32 / 2);
        let (hw, hh) = ((w as i32 / 6).max(10), (h as i32 / 6).max(10));

        let index = self.config.frames.len();
        let mut zone = ArenaZone::new(
            format!("Zone_{}", index + 1),
            [cx - hw, cy - hh],
            [cx + hw, cy + hh],
        );
        zone.color = Some(palette::zone_color(index));
        self.config.frames.push(zone);
        self.selected = index;
        self.dirty = true;
        self.status = format!("Added zone {}", index + 1);
    }

    pub fn delete_zone(&mut self) {
        if self.selected < self.config.frames.len() {
            let zone = self.config.frames.remove(self.selected);
            self.status = format!("Deleted zone {:?}", zone.name);
            if self.selected > 0 && self.selected >= self.config.frames.len() {
                self.selected -= 1;
            }
            self.dirty = true;
        }
    }

    pub fn begin_rename(&mut self) {
        if let Some(zone) = self.selected_zone() {
            self.mode = Mode::Rename {
                buffer: zone.name.clone(),
            };
        }
    }

    pub fn rename_push(&mut self, c: char) {
        if let Mode::Rename { buffer } = &mut self.mode {
            buffer.push(c);
        }
    }

    pub fn rename_backspace(&mut self) {
        if let Mode::Rename { buffer } = &mut self.mode {
            buffer.pop();
        }
    }

    pub fn rename_commit(&mut self) {
        if let Mode::Rename { buffer } = &self.mode {
            let name = buffer.trim();
            if !name.is_empty() {
                if let Some(zone) = self.config.frames.get_mut(self.selected) {
                    zone.name = name.to_string();
                    self.dirty = true;
                }
            }
        }
        self.mode = Mode::Browse;
    }

    pub fn rename_cancel(&mut self) {
        self.mode = Mode::Browse;
    }

    /// Normalise all zones against the frame bounds and write the config
    /// back to disk.
    pub fn save(&mut self) -> Result<()> {
        let (w, h) = self
            .frame_dims
            .unwrap_or((self.config.window_width, self.config.window_height));
        for zone in &mut self.config.frames {
            zone.normalise(w, h);
        }
        self.config.save(&self.config_path)?;
        self.dirty = false;
        self.status = format!("Saved {:?}", self.config_path);
        Ok(())
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> EditorApp {
        let mut config = AnalysisConfig::default();
        config.frames = vec![
            ArenaZone::new("A", [10, 10], [100, 100]),
            ArenaZone::new("B", [120, 10], [220, 100]),
        ];
        EditorApp::new(config, PathBuf::from("test_config.json"), Some((640, 480)))
    }

    #[test]
    fn test_selection_wraps() {
        let mut app = app();
        assert_eq!(app.selected, 0);
        app.select_next();
        assert_eq!(app.selected, 1);
        app.select_next();
        assert_eq!(app.selected, 0);
        app.select_prev();
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_field_cycle_roundtrip() {
        let mut field = Field::Left;
        for _ in 0..Field::ALL.len() {
            field = field.next();
        }
        assert_eq!(field, Field::Left);
        assert_eq!(Field::Left.prev(), Field::Rotation);
    }

    #[test]
    fn test_nudge_moves_active_field() {
        let mut app = app();
        app.field = Field::Right;
        app.nudge(10);
        app.nudge(-3);
        assert_eq!(app.config.frames[0].bottom_right[0], 107);
        assert!(app.dirty);

        app.field = Field::Rotation;
        app.nudge(15);
        assert_eq!(app.config.frames[0].rotation, 15.0);
    }

    #[test]
    fn test_add_zone_gets_palette_color_and_selection() {
        let mut app = app();
        app.add_zone();
        assert_eq!(app.config.frames.len(), 3);
        assert_eq!(app.selected, 2);
        let zone = app.selected_zone().unwrap();
        assert_eq!(zone.color, Some(palette::zone_color(2)));
        // Default geometry sits inside the frame.
        assert!(zone.top_left[0] >= 0 && zone.bottom_right[0] <= 640);
    }

    #[test]
    fn test_delete_last_zone_moves_selection_back() {
        let mut app = app();
        app.select_next();
        app.delete_zone();
        assert_eq!(app.config.frames.len(), 1);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_rename_flow() {
        let mut app = app();
        app.begin_rename();
        assert!(matches!(app.mode, Mode::Rename { .. }));
        app.rename_backspace();
        app.rename_push('C');
        app.rename_push('y');
        app.rename_push('l');
        app.rename_commit();
        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.config.frames[0].name, "Cyl");
    }

    #[test]
    fn test_rename_cancel_keeps_name() {
        let mut app = app();
        app.begin_rename();
        app.rename_push('X');
        app.rename_cancel();
        assert_eq!(app.config.frames[0].name, "A");
    }

    #[test]
    fn test_save_normalises_zones() {
        let mut app = app();
        let path = std::env::temp_dir().join("mobility_editor_save.json");
        app.config_path = path.clone();
        // Drag the right edge past the frame and invert the vertical corners.
        app.config.frames[0].bottom_right = [900, 5];
        app.save().unwrap();
        std::fs::remove_file(&path).ok();

        assert!(!app.dirty);
        let zone = &app.config.frames[0];
        assert_eq!(zone.bottom_right[0], 640);
        assert!(zone.top_left[1] <= zone.bottom_right[1]);
    }
}
