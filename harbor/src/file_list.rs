//! The custom-drawn file list.
//!
//! Rows and group headers are painted directly onto one allocated surface
//! inside a scroll area. All offsets come from `harborcore::list_geometry`,
//! so what is drawn, what a click hits, and where scroll-into-view lands
//! always agree. Interactions are reported back to the owner as
//! [`ListEvents`] rather than handled here; navigation and file opening
//! stay the owner's business.

use std::path::PathBuf;

use egui::{Align2, FontId, PointerButton, Pos2, Rect, Sense, Vec2};
use harborcore::list_geometry::{self, Band, HEADER_HEIGHT, ROW_HEIGHT};
use harborcore::listing::{format_size, Entry};
use harborcore::theme::Palette;

use crate::icons;

/// Interactions one frame produced, for the owner to act on.
#[derive(Default)]
pub struct ListEvents {
    /// Selection moved to this index (click or programmatic move).
    pub selection_changed: Option<usize>,
    /// Descend into this directory.
    pub open_dir: Option<PathBuf>,
    /// Open this file with the platform handler.
    pub open_file: Option<PathBuf>,
    /// Context menu asked to trash this path.
    pub delete: Option<PathBuf>,
    /// Context menu asked to tag this path.
    pub add_tag: Option<PathBuf>,
    /// A drag began on this row.
    pub drag_started: Option<usize>,
}

pub struct FileListView {
    /// Non-selectable lists (the directory preview) draw no selection and
    /// only react to double-clicks on directories.
    can_select: bool,
    id_source: &'static str,
    pub selected: Option<usize>,
    /// One-shot scroll offset applied on the next frame.
    scroll_to: Option<f32>,
    last_offset: f32,
    viewport_height: f32,
    context_index: Option<usize>,
}

impl FileListView {
    pub fn new(can_select: bool, id_source: &'static str) -> Self {
        Self {
            can_select,
            id_source,
            selected: None,
            scroll_to: None,
            last_offset: 0.0,
            viewport_height: 0.0,
            context_index: None,
        }
    }

    /// The entry sequence was replaced: selection resets to the first entry
    /// (or nothing) and the view scrolls back to the top.
    pub fn reset_for(&mut self, entries: &[Entry]) {
        self.selected = if self.can_select && !entries.is_empty() {
            Some(0)
        } else {
            None
        };
        self.context_index = None;
        self.scroll_to = Some(0.0);
    }

    /// Select `index` (clamped) and scroll it into view.
    pub fn select(&mut self, index: usize, entries: &[Entry]) {
        if !self.can_select || entries.is_empty() {
            return;
        }
        self.selected = Some(index.min(entries.len() - 1));
        self.request_scroll(entries);
    }

    /// Move the selection by `delta`, clamped to the sequence. Returns true
    /// when the selection actually moved.
    pub fn move_selection(&mut self, delta: i32, entries: &[Entry]) -> bool {
        if !self.can_select || entries.is_empty() {
            return false;
        }
        let current = match self.selected {
            Some(i) => i,
            None => {
                self.selected = Some(0);
                self.request_scroll(entries);
                return true;
            }
        };
        let last = entries.len() - 1;
        let target = (current as i64 + delta as i64).clamp(0, last as i64) as usize;
        if target == current {
            return false;
        }
        self.selected = Some(target);
        self.request_scroll(entries);
        true
    }

    /// Jump to the first entry whose name starts with `letter`.
    pub fn select_by_letter(&mut self, letter: char, entries: &[Entry]) -> bool {
        let lower = letter.to_lowercase().to_string();
        for (i, entry) in entries.iter().enumerate() {
            if entry.name.to_lowercase().starts_with(&lower) {
                self.select(i, entries);
                return true;
            }
        }
        false
    }

    /// The selected entry, if any.
    pub fn selected_entry<'e>(&self, entries: &'e [Entry]) -> Option<&'e Entry> {
        self.selected.and_then(|i| entries.get(i))
    }

    fn request_scroll(&mut self, entries: &[Entry]) {
        if let Some(index) = self.selected {
            if let Some(offset) = list_geometry::scroll_correction(
                entries,
                index,
                self.last_offset,
                self.viewport_height,
            ) {
                self.scroll_to = Some(offset);
            }
        }
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        entries: &[Entry],
        marked: &[PathBuf],
    ) -> ListEvents {
        let mut events = ListEvents::default();

        let mut area = egui::ScrollArea::vertical()
            .id_source(self.id_source)
            .auto_shrink([false, false]);
        if let Some(offset) = self.scroll_to.take() {
            area = area.vertical_scroll_offset(offset);
        }

        let output = area.show(ui, |ui| {
            let width = ui.available_width();
            // Inside a vertical scroll area the available height is
            // unbounded; pad to last frame's viewport so clicks on the
            // empty tail still land on the surface.
            let height = list_geometry::content_height(entries).max(self.viewport_height);
            let (rect, response) =
                ui.allocate_exact_size(Vec2::new(width, height), Sense::click_and_drag());

            let painter = ui.painter();
            painter.rect_filled(rect, 0.0, Palette::BACKGROUND);

            let hover_index = if self.can_select {
                response
                    .hover_pos()
                    .and_then(|p| list_geometry::item_at(entries, p.y - rect.min.y))
            } else {
                None
            };

            for band in list_geometry::bands(entries) {
                match band {
                    Band::Header { group, top } => {
                        let band_rect = Rect::from_min_size(
                            Pos2::new(rect.min.x, rect.min.y + top),
                            Vec2::new(width, HEADER_HEIGHT),
                        );
                        if !ui.is_rect_visible(band_rect) {
                            continue;
                        }
                        painter.rect_filled(band_rect, 0.0, Palette::HEADER_BG);
                        painter.text(
                            Pos2::new(band_rect.min.x + 8.0, band_rect.center().y),
                            Align2::LEFT_CENTER,
                            group,
                            FontId::proportional(10.0),
                            Palette::HEADER_TEXT,
                        );
                    }
                    Band::Row { index, top } => {
                        let row_rect = Rect::from_min_size(
                            Pos2::new(rect.min.x, rect.min.y + top),
                            Vec2::new(width, ROW_HEIGHT),
                        );
                        if !ui.is_rect_visible(row_rect) {
                            continue;
                        }
                        let entry = &entries[index];
                        let is_selected = self.can_select && self.selected == Some(index);
                        let is_marked = marked.iter().any(|p| *p == entry.path);

                        // Selection wins over the copy/cut mark.
                        let (bg, fg) = if is_selected {
                            (Some(Palette::SELECTED_BG), Palette::SELECTED_TEXT)
                        } else if is_marked {
                            (Some(Palette::MARKED_BG), Palette::TEXT)
                        } else if hover_index == Some(index) {
                            (Some(Palette::HOVER_BG), Palette::TEXT)
                        } else {
                            (None, Palette::TEXT)
                        };
                        if let Some(bg) = bg {
                            painter.rect_filled(row_rect, 0.0, bg);
                        }

                        painter.text(
                            Pos2::new(row_rect.min.x + 8.0, row_rect.center().y),
                            Align2::LEFT_CENTER,
                            icons::glyph(&entry.name, entry.is_dir),
                            FontId::proportional(16.0),
                            fg,
                        );
                        painter.text(
                            Pos2::new(row_rect.min.x + 40.0, row_rect.center().y),
                            Align2::LEFT_CENTER,
                            &entry.name,
                            FontId::proportional(14.0),
                            fg,
                        );

                        let detail = if entry.is_dir {
                            format!("{} items", entry.item_count)
                        } else if entry.size > 0 {
                            format_size(entry.size)
                        } else {
                            String::new()
                        };
                        if !detail.is_empty() {
                            painter.text(
                                Pos2::new(row_rect.max.x - 12.0, row_rect.center().y),
                                Align2::RIGHT_CENTER,
                                detail,
                                FontId::proportional(11.0),
                                Palette::DIM_TEXT,
                            );
                        }
                    }
                }
            }

            let hit = response
                .interact_pointer_pos()
                .and_then(|p| list_geometry::item_at(entries, p.y - rect.min.y));

            if self.can_select {
                if response.clicked() {
                    if let Some(index) = hit {
                        self.selected = Some(index);
                        events.selection_changed = Some(index);
                    }
                }
                if response.secondary_clicked() {
                    if let Some(index) = hit {
                        self.context_index = Some(index);
                        self.selected = Some(index);
                        events.selection_changed = Some(index);
                    }
                }
                if response.drag_started_by(PointerButton::Primary) {
                    if let Some(index) = hit {
                        events.drag_started = Some(index);
                    }
                }
            }
            if response.double_clicked() {
                if let Some(entry) = hit.and_then(|i| entries.get(i)) {
                    if entry.is_dir {
                        events.open_dir = Some(entry.path.clone());
                    } else if self.can_select {
                        events.open_file = Some(entry.path.clone());
                    }
                }
            }

            if self.can_select {
                response.context_menu(|ui| {
                    let entry = self.context_index.and_then(|i| entries.get(i));
                    if let Some(entry) = entry {
                        if ui.button("Open").clicked() {
                            if entry.is_dir {
                                events.open_dir = Some(entry.path.clone());
                            } else {
                                events.open_file = Some(entry.path.clone());
                            }
                            ui.close_menu();
                        }
                        if ui.button("Delete").clicked() {
                            events.delete = Some(entry.path.clone());
                            ui.close_menu();
                        }
                        if ui.button("Add Tag").clicked() {
                            events.add_tag = Some(entry.path.clone());
                            ui.close_menu();
                        }
                    } else {
                        ui.close_menu();
                    }
                });
            }
        });

        self.last_offset = output.state.offset.y;
        self.viewport_height = output.inner_rect.height();
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> Entry {
        Entry {
            name: name.to_string(),
            path: PathBuf::from("/t").join(name),
            is_dir: false,
            group: String::new(),
            item_count: 0,
            size: 0,
            modified: None,
        }
    }

    fn view_with(entries: &[Entry]) -> FileListView {
        let mut view = FileListView::new(true, "test_list");
        view.reset_for(entries);
        view
    }

    #[test]
    fn replacement_resets_selection_to_first() {
        let entries = vec![entry("a"), entry("b")];
        let mut view = view_with(&entries);
        assert_eq!(view.selected, Some(0));
        view.reset_for(&[]);
        assert_eq!(view.selected, None);
    }

    #[test]
    fn movement_clamps_at_both_ends() {
        let entries = vec![entry("a"), entry("b"), entry("c")];
        let mut view = view_with(&entries);
        assert!(!view.move_selection(-1, &entries));
        assert_eq!(view.selected, Some(0));
        assert!(view.move_selection(1, &entries));
        assert!(view.move_selection(5, &entries));
        assert_eq!(view.selected, Some(2));
        assert!(!view.move_selection(1, &entries));
        assert_eq!(view.selected, Some(2));
    }

    #[test]
    fn movement_tolerates_an_empty_sequence() {
        let mut view = view_with(&[]);
        assert!(!view.move_selection(1, &[]));
        assert!(!view.move_selection(-1, &[]));
        assert_eq!(view.selected, None);
        assert!(view.selected_entry(&[]).is_none());
    }

    #[test]
    fn letter_jump_is_case_insensitive() {
        let entries = vec![entry("alpha"), entry("Beta"), entry("gamma")];
        let mut view = view_with(&entries);
        assert!(view.select_by_letter('B', &entries));
        assert_eq!(view.selected, Some(1));
        assert!(view.select_by_letter('g', &entries));
        assert_eq!(view.selected, Some(2));
        assert!(!view.select_by_letter('z', &entries));
        assert_eq!(view.selected, Some(2));
    }

    #[test]
    fn non_selectable_views_ignore_selection_calls() {
        let entries = vec![entry("a")];
        let mut view = FileListView::new(false, "preview_test");
        view.reset_for(&entries);
        assert_eq!(view.selected, None);
        view.select(0, &entries);
        assert!(!view.move_selection(1, &entries));
        assert_eq!(view.selected, None);
    }
}
