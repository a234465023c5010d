pub mod cdg;
pub mod ddg;
pub mod pdg;

pub use cdg::construct_cdg;
pub use ddg::construct_ddg;
pub use pdg::construct_pdg;
