pub mod partner_reader;
pub mod sales_reader;
pub mod transaction_writer;
