use super::*;

impl Layouter<'_> {
    /// One literal per line at a fixed pitch of `pred_line_spacing` em.
    pub(super) fn layout_pred(&mut self, root: ElementId) -> (f32, f32) {
        let lines = &self.config.lines;
        let (gap, pad, pitch) = (
            lines.pred_token_gap,
            lines.label_box_pad,
            lines.pred_font_size * lines.pred_line_spacing,
        );
        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;
        for (idx, line) in self.scene.children(root).to_vec().into_iter().enumerate() {
            let (w, h) = self.layout_token_row(line, gap, pad, pad);
            let y = idx as f32 * pitch;
            self.geometry.place(line, 0.0, y);
            width = width.max(w);
            height = height.max(y + h);
        }
        self.geometry.set_size(root, width, height);
        (width, height)
    }

    pub(super) fn layout_trace(&mut self, root: ElementId) -> (f32, f32) {
        let pitch = self.config.lines.trace_font_size * self.config.lines.trace_line_spacing;
        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;
        for (idx, step) in self.scene.children(root).to_vec().into_iter().enumerate() {
            let (w, h) = self.layout_text(step);
            let y = idx as f32 * pitch;
            self.geometry.place(step, 0.0, y);
            width = width.max(w);
            height = height.max(y + h);
        }
        self.geometry.set_size(root, width, height);
        (width, height)
    }

    /// Surface string on top; below it, each field's string with its feature structures
    /// stacked underneath, fields separated by `-`.
    pub(super) fn layout_morph(&mut self, root: ElementId) -> (f32, f32) {
        let lines = &self.config.lines;
        let (gap, line_gap, fs_gap) = (
            lines.morph_token_gap,
            lines.morph_line_gap,
            lines.morph_fs_gap,
        );

        let children = self.scene.children(root).to_vec();
        let Some((surface, rest)) = children.split_first() else {
            self.geometry.set_size(root, 0.0, 0.0);
            return (0.0, 0.0);
        };
        let (surface_w, surface_h) = self.layout_text(*surface);
        self.geometry.place(*surface, 0.0, 0.0);

        let fields_y = surface_h + line_gap;
        let mut x = 0.0;
        let mut bottom = surface_h;
        for child in rest {
            let (w, h) = match self.scene.kind(*child) {
                ElementKind::Line => self.layout_morph_field(*child, fs_gap),
                _ => self.layout_text(*child),
            };
            self.geometry.place(*child, x, fields_y);
            bottom = bottom.max(fields_y + h);
            x += w + gap;
        }
        let fields_w = if rest.is_empty() { 0.0 } else { x - gap };
        let width = surface_w.max(fields_w);
        self.geometry.set_size(root, width, bottom);
        (width, bottom)
    }

    fn layout_morph_field(&mut self, field: ElementId, fs_gap: f32) -> (f32, f32) {
        let mut y = 0.0;
        let mut width: f32 = 0.0;
        for part in self.scene.children(field).to_vec() {
            let (w, h) = match self.scene.kind(part) {
                ElementKind::Fs => {
                    y += fs_gap;
                    self.layout_fs(part)
                }
                _ => self.layout_text(part),
            };
            self.geometry.place(part, 0.0, y);
            width = width.max(w);
            y += h;
        }
        self.geometry.set_size(field, width, y);
        (width, y)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::layout_entry;
    use super::*;

    #[test]
    fn predicate_lines_use_a_fixed_pitch() {
        let (scene, root, geometry) = layout_entry(
            r#"<entry name="t"><semantics>
               <literal negated="no"><label><sym varname="@l1"/></label><predicate><sym value="p"/></predicate><arg><sym varname="@x"/></arg></literal>
               <literal negated="yes"><label><sym varname="@l2"/></label><predicate><sym value="q"/></predicate><arg><sym varname="@y"/></arg></literal>
               </semantics></entry>"#,
            true,
        );
        assert_eq!(scene.kind(root), ElementKind::Pred);
        let lines = scene.children(root);
        assert_eq!(geometry.rect(lines[0]).y, 0.0);
        assert!((geometry.rect(lines[1]).y - 37.5).abs() < 1e-3);
    }

    #[test]
    fn morph_fields_follow_each_other() {
        let (scene, root, geometry) = layout_entry(
            r#"<entry name="t"><morph><string value="walked"/><fields>
               <field><string value="walk"/><feats><fs><f name="pos"><sym value="v"/></f></fs></feats></field>
               <field><string value="ed"/><feats><fs><f name="tense"><sym value="past"/></f></fs></feats></field>
               </fields></morph></entry>"#,
            false,
        );
        assert_eq!(scene.kind(root), ElementKind::Morph);
        let children = scene.children(root);
        assert_eq!(children.len(), 4);
        let first = geometry.rect(children[1]);
        let dash = geometry.rect(children[2]);
        let second = geometry.rect(children[3]);
        assert!(dash.x >= first.right());
        assert!(second.x >= dash.right());
        assert!(first.y > geometry.rect(children[0]).bottom());
    }
}
