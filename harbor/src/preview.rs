//! Preview panel.
//!
//! Shows whatever the selected entry is: a directory through the same
//! listing pipeline as the main view (non-selectable list), an image
//! decoded into a texture, the head of a text file, a trashed item's
//! origin, or plain file facts. Media and document rendering are out of
//! scope; those files get the facts view.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use egui::TextureHandle;
use harborcore::listing::{self, format_size, Entry, ListOptions, SortOrder};
use harborcore::special::SpecialPathManager;
use harborcore::theme::Palette;
use harborcore::trash;

use crate::file_list::FileListView;
use crate::icons;

/// Most text shown before the preview cuts off.
const TEXT_PREVIEW_LIMIT: usize = 64 * 1024;

enum Preview {
    Empty,
    Directory {
        name: String,
        entries: Vec<Entry>,
    },
    Image {
        path: PathBuf,
        texture: Option<TextureHandle>,
        dimensions: Option<(u32, u32)>,
        failed: bool,
    },
    Text {
        name: String,
        content: String,
        truncated: bool,
    },
    TrashInfo {
        name: String,
        item: Option<trash::TrashItem>,
    },
    FileInfo {
        entry: Entry,
    },
}

pub struct PreviewPanel {
    target: Option<String>,
    preview: Preview,
    list: FileListView,
}

/// What the owner should do after a preview interaction.
#[derive(Default)]
pub struct PreviewEvents {
    /// Navigate the main view to this path.
    pub navigate: Option<String>,
}

impl PreviewPanel {
    pub fn new() -> Self {
        Self {
            target: None,
            preview: Preview::Empty,
            list: FileListView::new(false, "preview_list"),
        }
    }

    /// Point the preview at a new selection target. `None` empties it.
    pub fn set_target(&mut self, target: Option<&str>, special: &SpecialPathManager) {
        if self.target.as_deref() == target {
            return;
        }
        self.target = target.map(String::from);
        self.preview = match target {
            None => Preview::Empty,
            Some(t) => Self::classify(t, special),
        };
        if let Preview::Directory { entries, .. } = &self.preview {
            self.list.reset_for(entries);
        }
    }

    /// Recompute the current preview (after a refresh of the main listing).
    pub fn refresh(&mut self, special: &SpecialPathManager) {
        let target = self.target.take();
        self.set_target(target.as_deref(), special);
    }

    fn classify(target: &str, special: &SpecialPathManager) -> Preview {
        if let Some(name) = target.strip_prefix(trash::SCHEME) {
            return Preview::TrashInfo {
                name: name.to_string(),
                item: trash::item_info(name),
            };
        }
        if let Some(provider) = special.resolve(target) {
            return Preview::Directory {
                name: provider.name(),
                entries: provider.items(),
            };
        }

        let path = Path::new(target);
        let Ok(meta) = fs::metadata(path) else {
            return Preview::Empty;
        };
        if meta.is_dir() {
            return Self::directory_preview(path);
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if icons::is_image(&name) {
            return Preview::Image {
                path: path.to_path_buf(),
                texture: None,
                dimensions: None,
                failed: false,
            };
        }
        if icons::is_text(&name) {
            return Self::text_preview(path, name);
        }
        match Entry::from_path(path) {
            Some(entry) => Preview::FileInfo { entry },
            None => Preview::Empty,
        }
    }

    /// Same pipeline as the main view: fresh default filters, name order.
    fn directory_preview(path: &Path) -> Preview {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let filters = match listing::derive_filters(path) {
            Ok(f) => f,
            Err(err) => {
                log::warn!("preview: {err}");
                return Preview::Directory {
                    name,
                    entries: Vec::new(),
                };
            }
        };
        let options = ListOptions {
            sort_order: SortOrder::ByName,
            search: "",
            filters: &filters,
        };
        let entries = match listing::list(path, &options) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("preview: {err}");
                Vec::new()
            }
        };
        Preview::Directory { name, entries }
    }

    fn text_preview(path: &Path, name: String) -> Preview {
        match fs::read(path) {
            Ok(bytes) => {
                let truncated = bytes.len() > TEXT_PREVIEW_LIMIT;
                let slice = &bytes[..bytes.len().min(TEXT_PREVIEW_LIMIT)];
                Preview::Text {
                    name,
                    content: String::from_utf8_lossy(slice).into_owned(),
                    truncated,
                }
            }
            Err(err) => {
                log::warn!("preview: cannot read {}: {err}", path.display());
                Preview::Empty
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> PreviewEvents {
        let mut events = PreviewEvents::default();
        match &mut self.preview {
            Preview::Empty => {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("nothing to preview").color(Palette::DIM_TEXT));
                });
            }
            Preview::Directory { name, entries } => {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("📁").size(16.0));
                    ui.label(egui::RichText::new(name.as_str()).strong());
                    ui.label(
                        egui::RichText::new(format!("{} items", entries.len()))
                            .color(Palette::DIM_TEXT),
                    );
                });
                ui.separator();
                let list_events = self.list.show(ui, entries, &[]);
                if let Some(dir) = list_events.open_dir {
                    events.navigate = Some(dir.to_string_lossy().into_owned());
                }
            }
            Preview::Image {
                path,
                texture,
                dimensions,
                failed,
            } => {
                if texture.is_none() && !*failed {
                    match load_image_texture(ui.ctx(), path) {
                        Some((tex, dims)) => {
                            *texture = Some(tex);
                            *dimensions = Some(dims);
                        }
                        None => *failed = true,
                    }
                }
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                ui.label(egui::RichText::new(name).strong());
                if let Some((w, h)) = dimensions {
                    ui.label(
                        egui::RichText::new(format!("{} x {}", w, h)).color(Palette::DIM_TEXT),
                    );
                }
                ui.separator();
                match texture {
                    Some(tex) => {
                        let avail = ui.available_width();
                        ui.add(egui::Image::new(&*tex).max_width(avail));
                    }
                    None => {
                        ui.label(
                            egui::RichText::new("cannot decode image").color(Palette::DIM_TEXT),
                        );
                    }
                }
            }
            Preview::Text {
                name,
                content,
                truncated,
            } => {
                ui.label(egui::RichText::new(name.as_str()).strong());
                ui.separator();
                egui::ScrollArea::vertical()
                    .id_source("preview_text")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(content.as_str()).monospace());
                        if *truncated {
                            ui.label(egui::RichText::new("…").color(Palette::DIM_TEXT));
                        }
                    });
            }
            Preview::TrashInfo { name, item } => {
                ui.label(egui::RichText::new(name.as_str()).strong());
                ui.separator();
                match item {
                    Some(item) => {
                        ui.label(format!("original: {}", item.original_path.display()));
                        ui.label(format!("deleted: {}", item.deleted_at));
                    }
                    None => {
                        ui.label(
                            egui::RichText::new("no trash record").color(Palette::DIM_TEXT),
                        );
                    }
                }
                if ui.button("open trash").clicked() {
                    events.navigate = Some(trash::SCHEME.to_string());
                }
            }
            Preview::FileInfo { entry } => {
                ui.label(egui::RichText::new(icons::glyph(&entry.name, entry.is_dir)).size(32.0));
                ui.label(egui::RichText::new(entry.name.as_str()).strong());
                ui.separator();
                ui.label(format!("size: {}", format_size(entry.size)));
                if let Some(modified) = entry.modified {
                    let when: DateTime<Local> = modified.into();
                    ui.label(format!("modified: {}", when.format("%Y-%m-%d %H:%M")));
                }
                ui.label(format!("path: {}", entry.path.display()));
            }
        }
        events
    }
}

fn load_image_texture(ctx: &egui::Context, path: &Path) -> Option<(TextureHandle, (u32, u32))> {
    let bytes = fs::read(path).ok()?;
    let img = image::load_from_memory(&bytes).ok()?;
    let dims = (img.width(), img.height());
    let rgba = img.to_rgba8();
    let color_image =
        egui::ColorImage::from_rgba_unmultiplied([dims.0 as usize, dims.1 as usize], rgba.as_raw());
    let texture = ctx.load_texture(
        format!("preview_{}", path.display()),
        color_image,
        egui::TextureOptions::LINEAR,
    );
    Some((texture, dims))
}
