use comfy_table::ContentArrangement;

/// `+---+` borders, `| a | b |` rows and no lines between rows
const ASCII_BORDERED: &str = "||--+-++|    ++++++";

/// A bordered text table with left-aligned cells
#[derive(Clone, Debug)]
pub struct Table {
    inner: comfy_table::Table,
    columns: usize,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let columns = headers.len();

        let mut inner = comfy_table::Table::new();
        inner
            .load_preset(ASCII_BORDERED)
            .set_content_arrangement(ContentArrangement::Disabled)
            .set_header(headers);

        Self { inner, columns }
    }

    /// Appends a row. Short rows are padded with empty cells, extra cells
    /// are dropped.
    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells
            .into_iter()
            .map(Into::into)
            .take(self.columns)
            .collect();
        row.resize(self.columns, String::new());
        self.inner.add_row(row);
    }

    /// Renders the table, one line per border or row, each ending in a newline
    pub fn render(&self) -> String {
        format!("{}\n", self.inner)
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }
}
