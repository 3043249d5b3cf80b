use super::*;

impl Layouter<'_> {
    /// Rows of `name value` between two square brackets. The structure is
    /// `sum(row heights) + (rows + 1) * row_padding` tall.
    pub(super) fn layout_fs(&mut self, fs: ElementId) -> (f32, f32) {
        let cfg = &self.config.fs;
        let (inset, pad, value_gap, nudge) =
            (cfg.inset, cfg.row_padding, cfg.value_gap, cfg.name_nudge);
        let (tip, empty_width) = (cfg.bracket_tip, cfg.empty_width);

        let mut y = pad;
        let mut right: f32 = 0.0;

        if let Some(fstype) = self.scene.child_of_kind(fs, ElementKind::Type) {
            let (w, h) = self.layout_text(fstype);
            self.geometry.place(fstype, inset, y);
            right = right.max(inset + w);
            y += h + pad;
        }

        let features: Vec<ElementId> = self
            .scene
            .children(fs)
            .iter()
            .copied()
            .filter(|id| self.scene.kind(*id) == ElementKind::Feature)
            .collect();

        let mut name_width: f32 = 0.0;
        for feature in &features {
            if let Some(name) = self.scene.child_of_kind(*feature, ElementKind::Text) {
                name_width = name_width.max(self.layout_text(name).0);
            }
        }
        let value_x = inset + name_width + value_gap;

        for feature in &features {
            let name = self.scene.child_of_kind(*feature, ElementKind::Text);
            let value = self.scene.child_of_kind(*feature, ElementKind::Value);
            let (name_w, name_h) = name.map(|id| self.geometry.size(id)).unwrap_or_default();
            let (value_w, value_h) = match value {
                Some(value) => self.layout_value(value),
                None => (0.0, 0.0),
            };
            let row_height = name_h.max(value_h);
            if let Some(name) = name {
                let name_y = ((value_h - name_h) / 2.0 + nudge).max(0.0);
                self.geometry.place(name, inset, name_y);
            }
            if let Some(value) = value {
                self.geometry.place(value, value_x, ((name_h - value_h) / 2.0).max(0.0));
            }
            let row_width = value_x + value_w;
            self.geometry.place(*feature, 0.0, y);
            self.geometry.set_size(*feature, row_width.max(inset + name_w), row_height);
            right = right.max(row_width);
            y += row_height + pad;
        }

        let width = if right > 0.0 { right + inset } else { empty_width };
        let height = y;
        self.geometry.set_size(fs, width, height);
        self.geometry.brackets.insert(
            fs,
            Brackets {
                left: vec![(1.0 + tip, 0.0), (1.0, 0.0), (1.0, height), (1.0 + tip, height)],
                right: vec![
                    (width - 1.0 - tip, 0.0),
                    (width - 1.0, 0.0),
                    (width - 1.0, height),
                    (width - 1.0 - tip, height),
                ],
            },
        );
        (width, height)
    }

    /// A value box: optional co-index label, then an atom or a nested structure.
    /// The label is vertically centred against the content.
    pub(super) fn layout_value(&mut self, value: ElementId) -> (f32, f32) {
        let cfg = &self.config.fs;
        let (pad_x, pad_y, atom_gap, fs_gap) =
            (cfg.label_pad_x, cfg.label_pad_y, cfg.atom_label_gap, cfg.label_gap);

        let label = self.scene.child_of_kind(value, ElementKind::Label);
        let (label_w, label_h) = match label {
            Some(label) => self.layout_label(label, pad_x, pad_y),
            None => (0.0, 0.0),
        };

        let content = self
            .scene
            .children(value)
            .iter()
            .copied()
            .find(|id| matches!(self.scene.kind(*id), ElementKind::Text | ElementKind::Fs));
        let (content_x, (content_w, content_h)) = match content {
            Some(id) if self.scene.kind(id) == ElementKind::Fs => {
                let gap = if label.is_some() { fs_gap } else { 0.0 };
                (label_w + gap, self.layout_fs(id))
            }
            Some(id) => {
                let gap = if label.is_some() { atom_gap } else { 0.0 };
                (label_w + gap, self.layout_text(id))
            }
            None => (label_w, (0.0, 0.0)),
        };

        let height = label_h.max(content_h);
        if let Some(label) = label {
            self.geometry.place(label, 0.0, ((content_h - label_h) / 2.0).max(0.0));
        }
        if let Some(content) = content {
            self.geometry.place(content, content_x, ((label_h - content_h) / 2.0).max(0.0));
        }
        let width = content_x + content_w;
        self.geometry.set_size(value, width, height);
        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::layout_entry;
    use super::*;

    fn first_fs(scene: &Scene, root: ElementId) -> ElementId {
        scene
            .descendants(root)
            .into_iter()
            .find(|id| scene.kind(*id) == ElementKind::Fs)
            .unwrap()
    }

    #[test]
    fn bracket_height_is_rows_plus_padding() {
        let (scene, root, geometry) = layout_entry(
            r#"<entry name="t"><tree><node type="std"><narg><fs>
               <f name="cat"><sym value="np"/></f>
               <f name="agr"><fs coref="@A"><f name="num"><sym value="sg"/></f><f name="pers"><sym value="3"/></f></fs></f>
               <f name="idx"><sym varname="@X"/></f>
               </fs></narg></node></tree></entry>"#,
            false,
        );
        let config = LayoutConfig::default();
        for fs in scene
            .descendants(root)
            .into_iter()
            .filter(|id| scene.kind(*id) == ElementKind::Fs)
        {
            let rows: Vec<f32> = scene
                .children(fs)
                .iter()
                .filter(|id| matches!(scene.kind(**id), ElementKind::Feature | ElementKind::Type))
                .map(|id| geometry.rect(*id).height)
                .collect();
            let expected =
                rows.iter().sum::<f32>() + (rows.len() as f32 + 1.0) * config.fs.row_padding;
            let brackets = &geometry.brackets[&fs];
            assert!((brackets.height() - expected).abs() < 1e-3);
            assert!((geometry.rect(fs).height - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn values_share_one_column() {
        let (scene, root, geometry) = layout_entry(
            r#"<entry name="t"><tree><node type="std"><narg><fs>
               <f name="a"><sym value="1"/></f>
               <f name="longer"><sym value="2"/></f>
               </fs></narg></node></tree></entry>"#,
            false,
        );
        let fs = first_fs(&scene, root);
        let xs: Vec<f32> = scene
            .children(fs)
            .iter()
            .map(|f| {
                let value = scene.child_of_kind(*f, ElementKind::Value).unwrap();
                geometry.rect(value).x
            })
            .collect();
        assert_eq!(xs[0], xs[1]);
        // 5 inset + "LONGER" at 13 * 0.6 per char + 5 gap
        assert!((xs[0] - (5.0 + 6.0 * 13.0 * 0.6 + 5.0)).abs() < 1e-3);
    }

    #[test]
    fn labelled_structure_sits_right_of_its_label() {
        let (scene, root, geometry) = layout_entry(
            r#"<entry name="t"><frame><fs coref="@E"><f name="actor"><sym varname="@X"/></f></fs></frame></entry>"#,
            true,
        );
        let value = scene.children(root)[0];
        let label = scene.child_of_kind(value, ElementKind::Label).unwrap();
        let fs = scene.child_of_kind(value, ElementKind::Fs).unwrap();
        let label_rect = geometry.rect(label);
        let fs_rect = geometry.rect(fs);
        assert!((fs_rect.x - (label_rect.width + 5.0)).abs() < 1e-3);
        let label_mid = label_rect.y + label_rect.height / 2.0;
        assert!((label_mid - fs_rect.height / 2.0).abs() < 1e-3);
    }

    #[test]
    fn empty_structure_has_minimum_width() {
        let (scene, root, geometry) = layout_entry(
            r#"<entry name="t"><tree><node type="std"><narg><fs/></narg></node></tree></entry>"#,
            false,
        );
        let fs = first_fs(&scene, root);
        assert_eq!(geometry.rect(fs).width, LayoutConfig::default().fs.empty_width);
        assert_eq!(geometry.rect(fs).height, LayoutConfig::default().fs.row_padding);
    }
}
