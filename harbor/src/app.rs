//! The harbor application: panels, state and event wiring.
//!
//! All listing and drawing happens synchronously on the UI loop. The two
//! background jobs (paste, trash) talk back over channels drained at the
//! top of every frame, so UI state is only ever mutated here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use egui::{Context, Key};
use harborcore::drag;
use harborcore::fileops::{self, PasteEvent, PasteRequest};
use harborcore::listing::{self, Entry, FilterSet, ListOptions, SortOrder};
use harborcore::special::SpecialPathManager;
use harborcore::storage;
use harborcore::theme::{menu_bar, status_bar, Palette};
use harborcore::trash::{self, TrashEvent};
use harborcore::RepaintController;

use crate::file_list::FileListView;
use crate::icons;
use crate::preview::PreviewPanel;
use crate::session::Session;

enum Dialog {
    None,
    CreateFile { name: String, focus: bool },
    CreateDir { name: String, focus: bool },
    Rename { target: PathBuf, name: String, focus: bool },
    AddTag { target: PathBuf, name: String, focus: bool },
}

pub struct HarborApp {
    /// Current location: a directory path or a virtual scheme.
    path: String,
    folder_name: String,
    entries: Vec<Entry>,
    filters: FilterSet,
    sort_order: SortOrder,
    search_text: String,
    search_open: bool,
    focus_search: bool,
    list: FileListView,
    preview: PreviewPanel,
    show_preview: bool,
    special: SpecialPathManager,
    /// Copy/cut staging; survives navigation until cleared or pasted.
    marked: Vec<PathBuf>,
    cut_pending: bool,
    /// Remembered selection per directory, restored when going back up.
    remembered: HashMap<String, usize>,
    back_stack: Vec<String>,
    forward_stack: Vec<String>,
    paste_rx: Option<Receiver<PasteEvent>>,
    paste_progress: f32,
    trash_tx: Sender<TrashEvent>,
    trash_rx: Receiver<TrashEvent>,
    error: Option<String>,
    dialog: Dialog,
    dragging: Option<Vec<PathBuf>>,
    drag_label: Option<String>,
    show_about: bool,
    show_shortcuts: bool,
    repaint: RepaintController,
}

impl HarborApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, start_dir: Option<PathBuf>) -> Self {
        let session = Session::load().unwrap_or_default();
        let path = start_dir
            .filter(|p| p.is_dir())
            .map(|p| p.to_string_lossy().into_owned())
            .or_else(|| {
                let p = PathBuf::from(&session.path);
                p.is_dir().then_some(session.path.clone())
            })
            .unwrap_or_else(|| storage::home_dir().to_string_lossy().into_owned());

        let (trash_tx, trash_rx) = mpsc::channel();
        let mut app = Self {
            path,
            folder_name: String::new(),
            entries: Vec::new(),
            filters: FilterSet::default(),
            sort_order: if session.sort_by_time {
                SortOrder::ByTime
            } else {
                SortOrder::ByName
            },
            search_text: String::new(),
            search_open: false,
            focus_search: false,
            list: FileListView::new(true, "main_list"),
            preview: PreviewPanel::new(),
            show_preview: session.show_preview,
            special: SpecialPathManager::new(),
            marked: Vec::new(),
            cut_pending: false,
            remembered: HashMap::new(),
            back_stack: Vec::new(),
            forward_stack: Vec::new(),
            paste_rx: None,
            paste_progress: 0.0,
            trash_tx,
            trash_rx,
            error: None,
            dialog: Dialog::None,
            dragging: None,
            drag_label: None,
            show_about: false,
            show_shortcuts: false,
            repaint: RepaintController::new(),
        };
        app.refresh(true);
        app
    }

    fn is_special(&self) -> bool {
        SpecialPathManager::is_special(&self.path)
    }

    fn save_session(&self) {
        Session {
            path: self.path.clone(),
            sort_by_time: self.sort_order == SortOrder::ByTime,
            show_preview: self.show_preview,
        }
        .save();
    }

    /// Recompute the whole listing. `new_filter` rebuilds the filter set
    /// from the directory contents (directory changed); search and sort
    /// toggles pass `false` and keep the user's filter toggles.
    fn refresh(&mut self, new_filter: bool) {
        if self.path.is_empty() {
            return;
        }
        let provided = self
            .special
            .resolve(&self.path)
            .map(|p| (p.items(), p.name()));
        if let Some((items, name)) = provided {
            self.entries = items;
            self.folder_name = name;
        } else {
            let path = PathBuf::from(&self.path);
            if new_filter {
                match listing::derive_filters(&path) {
                    Ok(filters) => self.filters = filters,
                    Err(err) => {
                        log::warn!("{err}");
                        self.error = Some(err.to_string());
                        self.entries.clear();
                        self.list.reset_for(&self.entries);
                        self.update_preview();
                        return;
                    }
                }
            }
            let options = ListOptions {
                sort_order: self.sort_order,
                search: &self.search_text,
                filters: &self.filters,
            };
            match listing::list(&path, &options) {
                Ok(entries) => self.entries = entries,
                Err(err) => {
                    // Unreadable directory: show nothing, log, keep running.
                    log::warn!("{err}");
                    self.error = Some(err.to_string());
                    self.entries.clear();
                }
            }
            self.folder_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.path.clone());
        }
        self.list.reset_for(&self.entries);
        self.update_preview();
        // The previewed directory may itself have changed on disk.
        self.preview.refresh(&self.special);
    }

    fn update_preview(&mut self) {
        let target = self
            .list
            .selected_entry(&self.entries)
            .map(|e| (e.path.to_string_lossy().into_owned(), e.is_dir));
        match target {
            Some((path, is_dir)) => {
                // Previewing a file counts as a visit.
                if !is_dir && !SpecialPathManager::is_special(&path) && Path::new(&path).is_file()
                {
                    self.special.add_recent(&path);
                }
                self.preview.set_target(Some(path.as_str()), &self.special);
            }
            None => self.preview.set_target(None, &self.special),
        }
    }

    fn remember_selection(&mut self) {
        if let Some(index) = self.list.selected {
            self.remembered.insert(self.path.clone(), index);
        }
    }

    /// Go somewhere new, recording the departure for back/forward and for
    /// selection restore.
    fn navigate(&mut self, target: String) {
        if target == self.path {
            self.refresh(true);
            return;
        }
        self.remember_selection();
        self.back_stack.push(self.path.clone());
        self.forward_stack.clear();
        self.set_path(target);
    }

    fn set_path(&mut self, target: String) {
        self.path = target;
        self.error = None;
        if !self.is_special() {
            self.special.add_recent(&self.path.clone());
        }
        self.refresh(true);
        self.save_session();
    }

    fn go_back(&mut self) {
        if let Some(previous) = self.back_stack.pop() {
            self.remember_selection();
            self.forward_stack.push(self.path.clone());
            self.set_path(previous);
            self.restore_remembered();
        }
    }

    fn go_forward(&mut self) {
        if let Some(next) = self.forward_stack.pop() {
            self.remember_selection();
            self.back_stack.push(self.path.clone());
            self.set_path(next);
            self.restore_remembered();
        }
    }

    fn restore_remembered(&mut self) {
        if let Some(&index) = self.remembered.get(&self.path) {
            self.list.select(index, &self.entries);
            self.update_preview();
        }
    }

    /// Left arrow: up to the parent, restoring the selection we left there.
    fn go_parent(&mut self) {
        let parent = match self.special.resolve(&self.path) {
            Some(provider) => provider.parent_path(),
            None => Path::new(&self.path)
                .parent()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        if parent.is_empty() {
            return;
        }
        self.navigate(parent);
        self.restore_remembered();
    }

    /// Right arrow / Enter on a directory: descend into the selection.
    fn descend(&mut self) {
        let Some(entry) = self.list.selected_entry(&self.entries) else {
            return;
        };
        if entry.is_dir {
            let target = entry.path.to_string_lossy().into_owned();
            self.navigate(target);
        }
    }

    fn open_selected(&mut self) {
        let Some((is_dir, path)) = self
            .list
            .selected_entry(&self.entries)
            .map(|e| (e.is_dir, e.path.clone()))
        else {
            return;
        };
        if is_dir {
            self.descend();
        } else {
            self.open_external(&path);
        }
    }

    /// Hand a file to the platform default handler. Virtual entries
    /// (trash contents) have no file behind them and are ignored.
    fn open_external(&mut self, path: &Path) {
        let display = path.to_string_lossy().into_owned();
        if SpecialPathManager::is_special(&display) {
            return;
        }
        if let Err(err) = open::that(path) {
            log::warn!("open {}: {err}", path.display());
        } else {
            self.special.add_recent(&display);
        }
    }

    /// Stage the selection for a later paste. Staging from a virtual path
    /// is rejected; marks survive navigation until cleared or consumed.
    fn mark_selected(&mut self, cut: bool) {
        if self.is_special() {
            return;
        }
        let Some(entry) = self.list.selected_entry(&self.entries) else {
            return;
        };
        let path = entry.path.clone();
        if !self.marked.contains(&path) {
            self.marked.push(path);
        }
        self.cut_pending = cut;
    }

    fn clear_marks(&mut self) {
        self.marked.clear();
        self.cut_pending = false;
    }

    /// Kick off the background paste of the marked set into the current
    /// directory. Pasting into a virtual path is a no-op.
    fn paste(&mut self) {
        if self.marked.is_empty() || self.paste_rx.is_some() {
            return;
        }
        if self.is_special() {
            self.error = Some("cannot paste into a virtual folder".to_string());
            return;
        }
        self.paste_progress = 0.0;
        self.paste_rx = Some(fileops::spawn_paste(PasteRequest {
            sources: self.marked.clone(),
            dest: PathBuf::from(&self.path),
            cut: self.cut_pending,
        }));
    }

    fn delete_path(&mut self, path: PathBuf) {
        if SpecialPathManager::is_special(path.to_string_lossy().as_ref()) {
            return;
        }
        trash::spawn_move_to_trash(path, self.trash_tx.clone());
    }

    fn delete_selected(&mut self) {
        if let Some(entry) = self.list.selected_entry(&self.entries) {
            let path = entry.path.clone();
            self.delete_path(path);
        }
    }

    fn open_terminal(&self) {
        if self.is_special() {
            return;
        }
        let result = std::process::Command::new("x-terminal-emulator")
            .current_dir(&self.path)
            .spawn();
        if let Err(err) = result {
            log::warn!("open terminal: {err}");
        }
    }

    /// Drain worker channels; the only place background results touch state.
    fn poll_workers(&mut self) {
        if let Some(rx) = self.paste_rx.take() {
            let mut finished = false;
            for event in rx.try_iter() {
                self.repaint.mark_needs_repaint();
                match event {
                    PasteEvent::Progress(fraction) => self.paste_progress = fraction,
                    PasteEvent::Finished { first_error } => {
                        finished = true;
                        if let Some(err) = first_error {
                            self.error = Some(err);
                        }
                    }
                }
            }
            if finished {
                self.clear_marks();
                self.refresh(true);
            } else {
                self.paste_rx = Some(rx);
            }
        }

        let events: Vec<TrashEvent> = self.trash_rx.try_iter().collect();
        for event in events {
            self.repaint.mark_needs_repaint();
            if event.ok {
                self.refresh(true);
            } else {
                self.error = Some(format!("could not trash {}", event.path.display()));
            }
        }
    }

    fn handle_keys(&mut self, ctx: &Context) {
        // Text fields own the keyboard while focused; list navigation only
        // runs with nothing focused. Command shortcuts stay global.
        let unfocused = ctx.memory(|m| m.focused().is_none());

        struct Intents {
            copy: bool,
            cut: bool,
            paste: bool,
            search: bool,
            rename: bool,
            escape: bool,
            up: bool,
            down: bool,
            left: bool,
            right: bool,
            enter: bool,
            delete: bool,
            letter: Option<char>,
        }
        let intents = ctx.input(|i| {
            let cmd = i.modifiers.command;
            let mut letter = None;
            if i.modifiers.shift && !cmd {
                for event in &i.events {
                    if let egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } = event
                    {
                        let name = key.name();
                        if modifiers.shift
                            && name.len() == 1
                            && name.chars().all(|c| c.is_ascii_alphabetic())
                        {
                            letter = name.chars().next();
                        }
                    }
                }
            }
            Intents {
                copy: cmd && i.key_pressed(Key::C),
                cut: cmd && i.key_pressed(Key::X),
                paste: cmd && i.key_pressed(Key::V),
                search: cmd && i.key_pressed(Key::F),
                rename: cmd && i.key_pressed(Key::R),
                escape: i.key_pressed(Key::Escape),
                up: unfocused && i.key_pressed(Key::ArrowUp),
                down: unfocused && i.key_pressed(Key::ArrowDown),
                left: unfocused && i.key_pressed(Key::ArrowLeft),
                right: unfocused && i.key_pressed(Key::ArrowRight),
                enter: unfocused && i.key_pressed(Key::Enter),
                delete: unfocused
                    && (i.key_pressed(Key::Delete) || i.key_pressed(Key::Backspace)),
                letter: if unfocused { letter } else { None },
            }
        });

        if intents.copy {
            self.mark_selected(false);
        }
        if intents.cut {
            self.mark_selected(true);
        }
        if intents.paste {
            self.paste();
        }
        if intents.search {
            self.search_open = !self.search_open;
            if self.search_open {
                self.focus_search = true;
            } else if !self.search_text.is_empty() {
                self.search_text.clear();
                self.refresh(false);
            }
        }
        if intents.rename {
            self.open_rename_dialog();
        }
        if intents.escape {
            self.clear_marks();
            self.dialog = Dialog::None;
        }
        if intents.up && self.list.move_selection(-1, &self.entries) {
            self.update_preview();
        }
        if intents.down && self.list.move_selection(1, &self.entries) {
            self.update_preview();
        }
        if intents.left {
            self.go_parent();
        }
        if intents.right {
            self.descend();
        }
        if intents.enter {
            self.open_selected();
        }
        if intents.delete {
            self.delete_selected();
        }
        if let Some(letter) = intents.letter {
            if self.list.select_by_letter(letter, &self.entries) {
                self.update_preview();
            }
        }
    }

    fn open_rename_dialog(&mut self) {
        if self.is_special() {
            return;
        }
        if let Some(entry) = self.list.selected_entry(&self.entries) {
            self.dialog = Dialog::Rename {
                target: entry.path.clone(),
                name: entry.name.clone(),
                focus: true,
            };
        }
    }

    fn render_menu(&mut self, ui: &mut egui::Ui) {
        menu_bar(ui, |ui| {
            ui.menu_button("file", |ui| {
                if ui.button("new file…").clicked() {
                    self.dialog = Dialog::CreateFile {
                        name: String::new(),
                        focus: true,
                    };
                    ui.close_menu();
                }
                if ui.button("new folder…").clicked() {
                    self.dialog = Dialog::CreateDir {
                        name: String::new(),
                        focus: true,
                    };
                    ui.close_menu();
                }
                ui.separator();
                let has_selection = self.list.selected.is_some();
                if ui
                    .add_enabled(has_selection, egui::Button::new("rename…  ctrl+r"))
                    .clicked()
                {
                    self.open_rename_dialog();
                    ui.close_menu();
                }
                if ui
                    .add_enabled(has_selection, egui::Button::new("move to trash  ⌫"))
                    .clicked()
                {
                    self.delete_selected();
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("open terminal here").clicked() {
                    self.open_terminal();
                    ui.close_menu();
                }
            });
            ui.menu_button("view", |ui| {
                let by_name = self.sort_order == SortOrder::ByName;
                if ui
                    .button(format!("{} sort by name", if by_name { "✓" } else { " " }))
                    .clicked()
                {
                    self.sort_order = SortOrder::ByName;
                    self.refresh(false);
                    self.save_session();
                    ui.close_menu();
                }
                if ui
                    .button(format!("{} sort by time", if by_name { " " } else { "✓" }))
                    .clicked()
                {
                    self.sort_order = SortOrder::ByTime;
                    self.refresh(false);
                    self.save_session();
                    ui.close_menu();
                }
                ui.separator();
                if ui
                    .button(format!(
                        "{} preview panel",
                        if self.show_preview { "✓" } else { " " }
                    ))
                    .clicked()
                {
                    self.show_preview = !self.show_preview;
                    self.save_session();
                    ui.close_menu();
                }
                if ui.button("refresh").clicked() {
                    self.refresh(true);
                    ui.close_menu();
                }
            });
            ui.menu_button("go", |ui| {
                if ui.button("back").clicked() {
                    self.go_back();
                    ui.close_menu();
                }
                if ui.button("forward").clicked() {
                    self.go_forward();
                    ui.close_menu();
                }
                if ui.button("up  ←").clicked() {
                    self.go_parent();
                    ui.close_menu();
                }
                ui.separator();
                let places = [
                    ("home", storage::home_dir()),
                    ("documents", storage::documents_dir()),
                    ("downloads", storage::downloads_dir()),
                ];
                for (label, path) in places {
                    if ui.button(label).clicked() {
                        self.navigate(path.to_string_lossy().into_owned());
                        ui.close_menu();
                    }
                }
                ui.separator();
                for (label, scheme) in [
                    ("trash", trash::SCHEME),
                    ("recent", harborcore::recent::SCHEME),
                    ("tags", harborcore::tags::SCHEME),
                ] {
                    if ui.button(label).clicked() {
                        self.navigate(scheme.to_string());
                        ui.close_menu();
                    }
                }
            });
            ui.menu_button("help", |ui| {
                if ui.button("keyboard shortcuts").clicked() {
                    self.show_shortcuts = true;
                    ui.close_menu();
                }
                if ui.button("about").clicked() {
                    self.show_about = true;
                    ui.close_menu();
                }
            });
        });
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("◀").on_hover_text("back").clicked() {
                self.go_back();
            }
            if ui.button("▶").on_hover_text("forward").clicked() {
                self.go_forward();
            }
            if ui.button("▲").on_hover_text("up").clicked() {
                self.go_parent();
            }
            if ui.button("⟳").on_hover_text("refresh").clicked() {
                self.refresh(true);
            }
            ui.separator();

            let sort_label = match self.sort_order {
                SortOrder::ByName => "name ▾",
                SortOrder::ByTime => "time ▾",
            };
            if ui.button(sort_label).on_hover_text("toggle sort order").clicked() {
                self.sort_order = match self.sort_order {
                    SortOrder::ByName => SortOrder::ByTime,
                    SortOrder::ByTime => SortOrder::ByName,
                };
                self.refresh(false);
                self.save_session();
            }

            ui.menu_button("filters ▾", |ui| {
                let mut toggled = None;
                for key in self.filters.synthetic_keys() {
                    let mut on = self.filters.is_enabled(key);
                    if ui.checkbox(&mut on, *key).changed() {
                        toggled = Some((key.to_string(), on));
                    }
                }
                if !self.filters.extension_keys().is_empty() {
                    ui.separator();
                }
                for key in self.filters.extension_keys() {
                    let mut on = self.filters.is_enabled(key);
                    if ui.checkbox(&mut on, key.as_str()).changed() {
                        toggled = Some((key.clone(), on));
                    }
                }
                if let Some((key, on)) = toggled {
                    self.filters.set_enabled(&key, on);
                    self.refresh(false);
                }
            });

            ui.menu_button("new ▾", |ui| {
                if ui.button("file…").clicked() {
                    self.dialog = Dialog::CreateFile {
                        name: String::new(),
                        focus: true,
                    };
                    ui.close_menu();
                }
                if ui.button("folder…").clicked() {
                    self.dialog = Dialog::CreateDir {
                        name: String::new(),
                        focus: true,
                    };
                    ui.close_menu();
                }
            });

            if ui.button("🔍").on_hover_text("search (ctrl+f)").clicked() {
                self.search_open = !self.search_open;
                if self.search_open {
                    self.focus_search = true;
                }
            }
        });
    }

    /// Clickable ancestor segments of the current location.
    fn render_pathbar(&mut self, ui: &mut egui::Ui) {
        let mut target = None;
        ui.horizontal_wrapped(|ui| {
            if self.is_special() {
                ui.label(egui::RichText::new(&self.folder_name).strong());
                return;
            }
            if ui.small_button("/").clicked() {
                target = Some("/".to_string());
            }
            let mut accumulated = String::new();
            for segment in self.path.split('/').filter(|s| !s.is_empty()) {
                accumulated.push('/');
                accumulated.push_str(segment);
                ui.label(egui::RichText::new("›").color(Palette::DIM_TEXT));
                if ui.small_button(segment).clicked() {
                    target = Some(accumulated.clone());
                }
            }
        });
        if let Some(target) = target {
            self.navigate(target);
        }
    }

    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        let mut target = None;
        ui.label(egui::RichText::new("places").small().color(Palette::DIM_TEXT));
        let places = [
            ("🏠 home", storage::home_dir()),
            ("📄 documents", storage::documents_dir()),
            ("📥 downloads", storage::downloads_dir()),
            ("🖼 pictures", storage::pictures_dir()),
            ("🎵 music", storage::music_dir()),
        ];
        for (label, path) in places {
            if ui.button(label).clicked() {
                target = Some(path.to_string_lossy().into_owned());
            }
        }
        ui.separator();
        for (label, scheme) in [
            ("🗑 trash", trash::SCHEME),
            ("🕓 recent", harborcore::recent::SCHEME),
            ("🏷 tags", harborcore::tags::SCHEME),
        ] {
            if ui.button(label).clicked() {
                target = Some(scheme.to_string());
            }
        }
        if let Some(target) = target {
            self.navigate(target);
        }
    }

    fn render_search_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("search:");
            let response = ui.text_edit_singleline(&mut self.search_text);
            if self.focus_search {
                self.focus_search = false;
                response.request_focus();
            }
            if response.changed() {
                self.refresh(false);
            }
            if ui.button("✕").clicked() {
                self.search_open = false;
                if !self.search_text.is_empty() {
                    self.search_text.clear();
                    self.refresh(false);
                }
            }
        });
    }

    fn status_line(&self) -> String {
        if self.paste_rx.is_some() {
            return format!(
                "pasting…  {:.0}%",
                (self.paste_progress * 100.0).clamp(0.0, 100.0)
            );
        }
        let mut line = match self.list.selected_entry(&self.entries) {
            Some(entry) if entry.is_dir => {
                format!("{}  —  {} items", entry.name, entry.item_count)
            }
            Some(entry) => format!(
                "{}  —  {}",
                entry.name,
                listing::format_size(entry.size)
            ),
            None => format!("{} items", self.entries.len()),
        };
        if !self.marked.is_empty() {
            let verb = if self.cut_pending { "cut" } else { "copy" };
            line.push_str(&format!(
                "  |  {} marked for {} (ctrl+v pastes, esc clears)",
                self.marked.len(),
                verb
            ));
        }
        line
    }

    fn render_dialogs(&mut self, ctx: &Context) {
        // The dialog is taken out of `self` for the frame so its fields and
        // the rest of the app can be borrowed independently.
        let mut dialog = std::mem::replace(&mut self.dialog, Dialog::None);
        let mut close = false;
        let is_file = matches!(dialog, Dialog::CreateFile { .. });
        match &mut dialog {
            Dialog::None => {}
            Dialog::CreateFile { name, focus } | Dialog::CreateDir { name, focus } => {
                let title = if is_file { "new file" } else { "new folder" };
                let mut accepted = false;
                let take_focus = *focus;
                *focus = false;
                egui::Window::new(title)
                    .collapsible(false)
                    .resizable(false)
                    .default_width(260.0)
                    .show(ctx, |ui| {
                        ui.horizontal(|ui| {
                            ui.label("name:");
                            let r = ui.text_edit_singleline(name);
                            if take_focus {
                                r.request_focus();
                            }
                            if r.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                                accepted = true;
                            }
                        });
                        ui.add_space(4.0);
                        ui.horizontal(|ui| {
                            if ui.button("cancel").clicked() {
                                close = true;
                            }
                            if ui.button("create").clicked() {
                                accepted = true;
                            }
                        });
                    });
                if accepted {
                    let dir = PathBuf::from(&self.path);
                    let name = name.clone();
                    let result = if self.is_special() {
                        Err(fileops::FileOpError::InvalidName(name.clone()))
                    } else if is_file {
                        fileops::create_file(&dir, &name)
                    } else {
                        fileops::create_dir(&dir, &name)
                    };
                    match result {
                        Ok(_) => {
                            close = true;
                            self.refresh(true);
                        }
                        Err(err) => self.error = Some(err.to_string()),
                    }
                }
            }
            Dialog::Rename {
                target,
                name,
                focus,
            } => {
                let mut accepted = false;
                let take_focus = *focus;
                *focus = false;
                egui::Window::new("rename")
                    .collapsible(false)
                    .resizable(false)
                    .default_width(300.0)
                    .show(ctx, |ui| {
                        ui.horizontal(|ui| {
                            ui.label("name:");
                            let r = ui.text_edit_singleline(name);
                            if take_focus {
                                r.request_focus();
                            }
                            if r.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                                accepted = true;
                            }
                        });
                        ui.add_space(4.0);
                        ui.horizontal(|ui| {
                            if ui.button("cancel").clicked() {
                                close = true;
                            }
                            if ui.button("rename").clicked() {
                                accepted = true;
                            }
                        });
                    });
                if accepted {
                    match fileops::rename(target, name) {
                        Ok(_) => {
                            close = true;
                            self.refresh(true);
                        }
                        Err(err) => self.error = Some(err.to_string()),
                    }
                }
            }
            Dialog::AddTag {
                target,
                name,
                focus,
            } => {
                let mut accepted = false;
                let mut remove: Option<String> = None;
                let mut quick_add: Option<String> = None;
                let take_focus = *focus;
                *focus = false;
                let current = self.special.tags().tags_for(target);
                let all = self.special.tags().all_tags();
                egui::Window::new("tags")
                    .collapsible(false)
                    .resizable(false)
                    .default_width(280.0)
                    .show(ctx, |ui| {
                        ui.label(
                            egui::RichText::new(target.to_string_lossy())
                                .small()
                                .color(Palette::DIM_TEXT),
                        );
                        if !current.is_empty() {
                            ui.add_space(4.0);
                            for tag in &current {
                                ui.horizontal(|ui| {
                                    ui.label(format!("🏷 {tag}"));
                                    if ui.small_button("✕").clicked() {
                                        remove = Some(tag.clone());
                                    }
                                });
                            }
                        }
                        let others: Vec<String> = all
                            .iter()
                            .filter(|t| !current.contains(t))
                            .cloned()
                            .collect();
                        if !others.is_empty() {
                            ui.add_space(4.0);
                            ui.horizontal_wrapped(|ui| {
                                for tag in others {
                                    if ui.small_button(tag.as_str()).clicked() {
                                        quick_add = Some(tag);
                                    }
                                }
                            });
                        }
                        ui.add_space(4.0);
                        ui.horizontal(|ui| {
                            ui.label("new tag:");
                            let r = ui.text_edit_singleline(name);
                            if take_focus {
                                r.request_focus();
                            }
                            if r.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                                accepted = true;
                            }
                        });
                        ui.add_space(4.0);
                        ui.horizontal(|ui| {
                            if ui.button("close").clicked() {
                                close = true;
                            }
                            if ui.button("add").clicked() {
                                accepted = true;
                            }
                        });
                    });
                let target = target.clone();
                let typed = name.trim().to_string();
                if let Some(tag) = remove {
                    self.special.tags_mut().remove(&target, &tag);
                }
                if let Some(tag) = quick_add {
                    self.special.tags_mut().add(&target, &tag);
                }
                if accepted && !typed.is_empty() {
                    self.special.tags_mut().add(&target, &typed);
                    name.clear();
                }
            }
        }
        if !close {
            self.dialog = dialog;
        }
    }

    fn render_overlays(&mut self, ctx: &Context) {
        // Drag silhouette following the cursor.
        if let (Some(label), Some(pos)) =
            (&self.drag_label, ctx.input(|i| i.pointer.hover_pos()))
        {
            let painter = ctx.layer_painter(egui::LayerId::new(
                egui::Order::Foreground,
                egui::Id::new("drag_preview"),
            ));
            painter.text(
                pos + egui::vec2(18.0, 18.0),
                egui::Align2::LEFT_CENTER,
                label,
                egui::FontId::proportional(12.0),
                Palette::TEXT,
            );
        }

        if self.show_about {
            egui::Window::new("about harbor")
                .collapsible(false)
                .resizable(false)
                .default_width(300.0)
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("harbor");
                        ui.label(format!("version {}", env!("CARGO_PKG_VERSION")));
                        ui.add_space(8.0);
                        ui.label("a keyboard-friendly file manager");
                    });
                    ui.add_space(8.0);
                    ui.vertical_centered(|ui| {
                        if ui.button("ok").clicked() {
                            self.show_about = false;
                        }
                    });
                });
        }

        if self.show_shortcuts {
            egui::Window::new("keyboard shortcuts")
                .collapsible(false)
                .resizable(false)
                .default_width(320.0)
                .show(ctx, |ui| {
                    let rows = [
                        ("↑ / ↓", "move selection"),
                        ("←", "go to parent folder"),
                        ("→", "enter selected folder"),
                        ("enter", "open file / enter folder"),
                        ("shift+letter", "jump to first match"),
                        ("ctrl+c / ctrl+x", "mark for copy / cut"),
                        ("ctrl+v", "paste marked files"),
                        ("esc", "clear marks, close dialogs"),
                        ("ctrl+f", "filter by name prefix"),
                        ("ctrl+r", "rename selection"),
                        ("⌫ / del", "move selection to trash"),
                    ];
                    for (keys, what) in rows {
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new(keys).monospace().strong());
                            ui.add_space(12.0);
                            ui.label(what);
                        });
                    }
                    ui.add_space(8.0);
                    ui.vertical_centered(|ui| {
                        if ui.button("ok").clicked() {
                            self.show_shortcuts = false;
                        }
                    });
                });
        }
    }
}

impl eframe::App for HarborApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_workers();
        self.repaint.set_continuous(self.paste_rx.is_some());
        self.handle_keys(ctx);

        egui::TopBottomPanel::top("menu").show(ctx, |ui| self.render_menu(ui));
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.render_toolbar(ui));
        egui::TopBottomPanel::top("pathbar").show(ctx, |ui| self.render_pathbar(ui));
        if self.search_open {
            egui::TopBottomPanel::top("search").show(ctx, |ui| self.render_search_bar(ui));
        }
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            status_bar(ui, &self.status_line());
        });
        egui::SidePanel::left("places")
            .resizable(false)
            .default_width(150.0)
            .show(ctx, |ui| self.render_sidebar(ui));
        if self.show_preview {
            egui::SidePanel::right("preview")
                .default_width(320.0)
                .show(ctx, |ui| {
                    let events = self.preview.show(ui);
                    if let Some(target) = events.navigate {
                        self.navigate(target);
                    }
                });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Palette::BACKGROUND))
            .show(ctx, |ui| {
                if let Some(error) = self.error.clone() {
                    ui.horizontal(|ui| {
                        ui.colored_label(Palette::ERROR, error);
                        if ui.small_button("✕").clicked() {
                            self.error = None;
                        }
                    });
                    ui.separator();
                }

                let events = self.list.show(ui, &self.entries, &self.marked);
                if let Some(_index) = events.selection_changed {
                    self.update_preview();
                }
                if let Some(dir) = events.open_dir {
                    self.navigate(dir.to_string_lossy().into_owned());
                }
                if let Some(file) = events.open_file {
                    self.open_external(&file);
                }
                if let Some(path) = events.delete {
                    self.delete_path(path);
                }
                if let Some(path) = events.add_tag {
                    self.dialog = Dialog::AddTag {
                        target: path,
                        name: String::new(),
                        focus: true,
                    };
                }
                if let Some(index) = events.drag_started {
                    if let Some(entry) = self.entries.get(index) {
                        let paths = vec![entry.path.clone()];
                        drag::start_drag(&paths);
                        self.drag_label =
                            Some(format!("{} {}", icons::glyph(&entry.name, entry.is_dir), entry.name));
                        self.dragging = Some(paths);
                    }
                }
            });

        // A released primary button ends any drag.
        if self.dragging.is_some() && ctx.input(|i| i.pointer.primary_released()) {
            drag::end_drag();
            self.dragging = None;
            self.drag_label = None;
        }

        self.render_dialogs(ctx);
        self.render_overlays(ctx);
        self.repaint.end_frame(ctx);
    }
}
