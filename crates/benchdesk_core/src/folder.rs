use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Dir,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
}

/// Response of `POST /api/browse`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FolderListing {
    pub current_folder: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub have_parent: bool,
    #[serde(default)]
    pub folders: Vec<FolderEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathKind {
    #[default]
    Folder,
    File,
}

/// Client-side navigation state of the folder picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderBrowser {
    current_path: String,
    path_kind: PathKind,
    with_files: bool,
    listing: Option<FolderListing>,
}

impl FolderBrowser {
    pub fn new(with_files: bool) -> Self {
        Self {
            current_path: ".".to_string(),
            path_kind: PathKind::Folder,
            with_files,
            listing: None,
        }
    }

    /// Path to load when the picker opens. A previously selected file is
    /// replaced by its containing folder.
    pub fn open(&mut self) -> String {
        self.leave_file();
        self.current_path.clone()
    }

    pub fn listing_received(&mut self, listing: FolderListing) {
        self.current_path = listing.current_folder.clone();
        self.path_kind = PathKind::Folder;
        self.listing = Some(listing);
    }

    /// Clicks an entry of the current listing. Returns the folder to load
    /// next, or `None` when a file was selected or the index is unknown.
    pub fn click_entry(&mut self, index: usize) -> Option<String> {
        let entry = self.listing.as_ref()?.folders.get(index)?.clone();
        self.current_path = entry.path;
        match entry.entry_type {
            EntryType::File => {
                self.path_kind = PathKind::File;
                None
            }
            EntryType::Dir => {
                self.path_kind = PathKind::Folder;
                Some(self.current_path.clone())
            }
        }
    }

    /// Returns the parent folder to load, unless the listing is at the root.
    pub fn click_parent(&mut self) -> Option<String> {
        let listing = self.listing.as_ref()?;
        if !listing.have_parent {
            return None;
        }
        let parent = listing.parent.clone()?;
        self.current_path = parent;
        self.path_kind = PathKind::Folder;
        Some(self.current_path.clone())
    }

    pub fn selected_path(&self) -> &str {
        &self.current_path
    }

    pub fn path_kind(&self) -> PathKind {
        self.path_kind
    }

    pub fn with_files(&self) -> bool {
        self.with_files
    }

    pub fn set_with_files(&mut self, with_files: bool) {
        self.with_files = with_files;
    }

    pub fn listing(&self) -> Option<&FolderListing> {
        self.listing.as_ref()
    }

    fn leave_file(&mut self) {
        if self.path_kind == PathKind::File {
            self.path_kind = PathKind::Folder;
            self.current_path.push_str("/..");
        }
    }
}

impl Default for FolderBrowser {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> FolderListing {
        serde_json::from_str(
            r#"{
                "current_folder": "/home/ana/data",
                "parent": "/home/ana",
                "have_parent": true,
                "folders": [
                    {"name": "images", "path": "/home/ana/data/images", "type": "dir"},
                    {"name": "labels.csv", "path": "/home/ana/data/labels.csv", "type": "file"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn dir_click_requests_load() {
        let mut browser = FolderBrowser::new(true);
        browser.listing_received(listing());
        assert_eq!(browser.click_entry(0).as_deref(), Some("/home/ana/data/images"));
    }

    #[test]
    fn file_click_selects_and_reopen_goes_up() {
        let mut browser = FolderBrowser::new(true);
        browser.listing_received(listing());
        assert_eq!(browser.click_entry(1), None);
        assert_eq!(browser.selected_path(), "/home/ana/data/labels.csv");
        assert_eq!(browser.path_kind(), PathKind::File);

        assert_eq!(browser.open(), "/home/ana/data/labels.csv/..");
        assert_eq!(browser.path_kind(), PathKind::Folder);
    }

    #[test]
    fn parent_disabled_at_root() {
        let mut browser = FolderBrowser::default();
        let mut root = listing();
        root.have_parent = false;
        browser.listing_received(root);
        assert_eq!(browser.click_parent(), None);
    }

    #[test]
    fn unknown_index_is_ignored() {
        let mut browser = FolderBrowser::default();
        assert_eq!(browser.click_entry(0), None);
        browser.listing_received(listing());
        assert_eq!(browser.click_entry(7), None);
        assert_eq!(browser.selected_path(), "/home/ana/data");
    }
}
