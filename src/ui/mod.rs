/// egui rendering: selector panels and the region figure.
pub mod panels;
pub mod plot;
