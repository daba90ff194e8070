mod node_views;

pub(crate) use node_views::NodeViews;
