/// Vista tabular que consumen los encoders de salida.
pub trait TableView {
    fn header(&self) -> Vec<String>;

    fn records(&self) -> Box<dyn Iterator<Item = Vec<String>> + '_>;

    fn row_count(&self) -> usize;
}
