pub mod noticia;
